// Application Layer - Use Cases and Business Logic

pub mod dispatcher;
pub mod lifecycle;
pub mod registry;
pub mod shutdown;

// Re-exports
pub use dispatcher::{CommandDispatcher, Invocation, Outcome, Reply};
pub use lifecycle::{LifecycleEngine, MentionStyle, QueueStats};
pub use registry::{QueueRegistry, RegistryGuard};
pub use shutdown::{shutdown_channel, ShutdownSender, ShutdownToken};
