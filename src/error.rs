pub type Error = Box<dyn std::error::Error + Send + Sync>;

/// Walk an error chain looking for an underlying `std::io::Error` and return
/// its kind.
pub fn io_error_kind(err: &(dyn std::error::Error + 'static)) -> Option<std::io::ErrorKind> {
    // Check if it's directly an IO error
    if let Some(io_err) = err.downcast_ref::<std::io::Error>() {
        return Some(io_err.kind());
    }

    // Otherwise check the chain
    let mut source = err.source();
    while let Some(err) = source {
        if let Some(io_err) = err.downcast_ref::<std::io::Error>() {
            return Some(io_err.kind());
        }
        source = err.source();
    }

    None
}
