//! 批量对账 CLI
//!
//! 两类模式：`listcolumns` 打印发现的可翻译列映射；
//! `dryrun`/`process` 按列定义文件对数据快照做对账，
//! `process` 提交后把快照写回。

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};

use transfilter::error::{FilterError, FilterResult};
use transfilter::reconcile::dataset::TransformRegistry;
use transfilter::reconcile::{ReconcileMode, Reconciler};
use transfilter::store::Snapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// 打印可翻译的 (表, 列) 映射并退出
    Listcolumns,
    /// 只报告将要复制的翻译，不落库
    Dryrun,
    /// 复制翻译并写回快照
    Process,
}

/// 把挂在陈旧嵌入哈希下的翻译批量迁移到当前内容哈希
#[derive(Parser, Debug)]
#[command(name = "transfilter", version, about)]
struct Cli {
    /// 运行模式
    #[arg(short, long, value_enum)]
    mode: Mode,

    /// 列定义文件（JSON：表名 → 列名数组），dryrun/process 必填
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// 数据快照文件（翻译记录 + 数据表）
    #[arg(short, long)]
    data: PathBuf,

    /// 资源引用改写的基地址
    #[arg(long, default_value = "pluginfile.php")]
    resource_base: String,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> FilterResult<()> {
    let snapshot = Snapshot::load(&cli.data)?;
    let store = snapshot.build_store();
    let transforms = TransformRegistry::with_defaults(&cli.resource_base);
    let reconciler = Reconciler::new(&store, &snapshot, &transforms);

    match cli.mode {
        Mode::Listcolumns => {
            let columns_by_table = reconciler.list_columns();
            println!("{}", serde_json::to_string_pretty(&columns_by_table)?);
        }
        Mode::Dryrun | Mode::Process => {
            let requested = load_column_map(cli.file.as_deref())?;
            let mode = if cli.mode == Mode::Process {
                ReconcileMode::Process
            } else {
                ReconcileMode::DryRun
            };

            let report = reconciler.run(mode, &requested)?;

            if mode == ReconcileMode::Process {
                let mut updated = snapshot.clone();
                updated.translations = store.records();
                updated.save(&cli.data)?;
            }

            println!("共 {} 条翻译复制", report.total_copies());
        }
    }

    Ok(())
}

/// 读取并解析列定义文件
///
/// 未指定、不可读和格式错误共用同一条消息。
fn load_column_map(path: Option<&std::path::Path>) -> FilterResult<BTreeMap<String, Vec<String>>> {
    let Some(path) = path else {
        return Err(FilterError::ColumnMap);
    };

    let raw = fs::read_to_string(path).map_err(|_| FilterError::ColumnMap)?;
    serde_json::from_str(&raw).map_err(|_| FilterError::ColumnMap)
}
