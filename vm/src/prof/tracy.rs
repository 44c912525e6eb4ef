#[global_allocator]
static GLOBAL: tracy_client::ProfiledAllocator<std::alloc::System> =
    tracy_client::ProfiledAllocator::new(std::alloc::System, 128);

pub(crate) use tracy_client::span;
pub use tracy_client::frame_mark;

/// Spans and frame marks require a running client.
pub fn start() {
    let _ = tracy_client::Client::start();
}
