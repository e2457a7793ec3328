pub mod clock;
pub mod http;
pub mod notifier;
pub mod storage;

pub use clock::SystemClock;
pub use http::HttpApi;
pub use notifier::{ConsoleNotifier, LogNotifier, RecordingNotifier};
pub use storage::{FileStorage, MemoryStorage};
