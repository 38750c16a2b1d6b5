mod common;

mod memory;
