// windvane-core: device resolution and resource shaping for the gateway.

pub mod resolver;

pub use resolver::{DeviceResolver, DeviceResource};
