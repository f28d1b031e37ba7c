mod no_debug;
pub use no_debug::NoDebug;
