pub mod stemmer;
pub mod stopword;
pub mod trimmer;

use std::sync::{Arc, Once};

use crate::analysis::pipeline::register_function;

pub use stemmer::StemmerFilter;
pub use stopword::StopWordFilter;
pub use trimmer::Trimmer;

/// Register the default filters under their serialization labels.
/// Idempotent; called whenever a builder or a loaded index needs the
/// default pipeline available.
pub fn register_defaults() {
    static ONCE: Once = Once::new();
    ONCE.call_once(|| {
        register_function(Arc::new(Trimmer));
        register_function(Arc::new(StopWordFilter::english()));
        register_function(Arc::new(StemmerFilter::english()));
    });
}
