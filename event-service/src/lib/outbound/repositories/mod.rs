pub mod event;
pub mod memory;
pub mod mongo;
pub mod text_index;
pub mod user;
