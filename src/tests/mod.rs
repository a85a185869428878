pub mod common;

mod dispatch;
