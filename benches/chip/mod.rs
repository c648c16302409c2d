mod dispatch;
mod encode;

pub use dispatch::bench_dispatch;
pub use encode::bench_encode;
