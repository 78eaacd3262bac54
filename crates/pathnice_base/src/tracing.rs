use crate::error::PathNiceResult;
pub use tracing::instrument;
pub use tracing::{debug, error, info, trace, warn};
use tracing_error::ErrorLayer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

pub fn init_tracing() -> PathNiceResult<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(ErrorLayer::default())
        .init();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    // The one place in this crate's tests that installs the global
    // subscriber; init() would panic on a second call.
    #[test]
    fn test_init_tracing_installs_a_subscriber() {
        init_tracing().unwrap();
        debug!("tracing initialized");
        assert!(tracing::dispatcher::has_been_set());
    }
}
