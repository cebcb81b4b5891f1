mod live_source;
mod source_pipe;

pub use live_source::LiveSource;
pub use source_pipe::{SampleBuffer, SourcePipe};
