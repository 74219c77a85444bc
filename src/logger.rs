use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// 安装全局的 fmt 订阅者。
///
/// `RUST_LOG` 存在且有效时优先使用；否则使用 `default_directives`，
/// 后者无效时退回 `info`。
pub fn init_logger(default_directives: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directives))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    if FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .is_err()
    {
        eprintln!("全局日志订阅者已经被初始化过了!");
    }
}
