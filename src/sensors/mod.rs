mod sample_source;

pub use self::sample_source::{RawSample, SampleSource};
