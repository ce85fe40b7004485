//! 外部协作者
//!
//! 进程枚举、进程探针、内存后端与输入注入器的接口，以及随服务一起提供的实现。

pub mod input;
pub mod memory;
pub mod process;
pub mod procfs;

pub use input::{HeadlessInjector, InputInjector, XdotoolInjector, create_input_injector};
pub use memory::{MemoryBackend, SimulatedMemoryBackend};
pub use process::{ProcessEntry, ProcessEnumerator, ProcessProbe, matches_keywords};
pub use procfs::ProcfsProcesses;
