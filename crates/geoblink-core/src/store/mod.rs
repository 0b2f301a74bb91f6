// ── Local device cache ──
//
// Push-updated storage for tracker devices. The sync path and any local
// edit path both write here; consumers only ever read the live view.

mod device_store;
mod stream;

pub use device_store::DeviceStore;
pub use stream::DeviceStream;
