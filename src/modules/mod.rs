pub mod books;

use tracker_kernel::ModuleRegistry;

use books::handlers::SharedTracker;

/// Register every service module with the registry
pub fn register_all(registry: &mut ModuleRegistry, tracker: SharedTracker) {
    registry.register(books::create_module(tracker));
}
