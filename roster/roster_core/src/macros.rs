//! Convenience macros for Roster.

/// Log a lifecycle event with the given level.
///
/// The event is emitted through `tracing` and prefixed with the calling
/// module. Optional `key => value` pairs are appended as metadata.
///
/// # Examples
///
/// ```
/// use roster_core::log_event;
/// use roster_core::utils::LogLevel;
///
/// log_event!(LogLevel::Info, "Role published");
///
/// log_event!(LogLevel::Warning, "Delete rejected",
///     role => "auditor",
///     assigned => 3,
/// );
/// ```
#[macro_export]
macro_rules! log_event {
    ($level:expr, $message:expr) => {
        {
            match $level {
                $crate::utils::LogLevel::Error => $crate::__tracing::error!("[{}] {}", module_path!(), $message),
                $crate::utils::LogLevel::Warning => $crate::__tracing::warn!("[{}] {}", module_path!(), $message),
                $crate::utils::LogLevel::Info => $crate::__tracing::info!("[{}] {}", module_path!(), $message),
                $crate::utils::LogLevel::Debug => $crate::__tracing::debug!("[{}] {}", module_path!(), $message),
                $crate::utils::LogLevel::Trace => $crate::__tracing::trace!("[{}] {}", module_path!(), $message),
            }
        }
    };

    ($level:expr, $message:expr, $($key:ident => $value:expr),+ $(,)?) => {
        {
            let metadata = vec![$(format!("{}={}", stringify!($key), $value)),+].join(" ");
            match $level {
                $crate::utils::LogLevel::Error => $crate::__tracing::error!("[{}] {}: {}", module_path!(), $message, metadata),
                $crate::utils::LogLevel::Warning => $crate::__tracing::warn!("[{}] {}: {}", module_path!(), $message, metadata),
                $crate::utils::LogLevel::Info => $crate::__tracing::info!("[{}] {}: {}", module_path!(), $message, metadata),
                $crate::utils::LogLevel::Debug => $crate::__tracing::debug!("[{}] {}: {}", module_path!(), $message, metadata),
                $crate::utils::LogLevel::Trace => $crate::__tracing::trace!("[{}] {}: {}", module_path!(), $message, metadata),
            }
        }
    };
}
