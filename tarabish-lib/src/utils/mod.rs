pub mod buffer_processor;
pub mod byte_buffer;
pub mod timers;
