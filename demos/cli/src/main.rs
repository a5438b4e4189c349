use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use onco_core::NormalizerConfig;
use onco_normalize::{augment, Dataset, OfflineInsights};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(
    name = "onco-cli",
    about = "Chuẩn hoá dữ liệu bệnh nhân ung bướu từ file CSV thành hồ sơ JSON."
)]
struct Args {
    /// Đường dẫn tới file CSV dữ liệu bệnh nhân.
    #[arg(short, long)]
    input: PathBuf,

    /// Tên bệnh nhân cần xem. Bỏ trống để liệt kê toàn bộ danh sách.
    #[arg(short, long)]
    name: Option<String>,

    /// File JSON cấu hình (chỉ cần các khoá muốn ghi đè).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Gắn thêm phần insight (dùng nội dung dự phòng khi không có dịch vụ).
    #[arg(long)]
    insights: bool,

    /// In JSON có thụt lề.
    #[arg(long)]
    pretty: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("onco_normalize=info,onco_cli=info")),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => {
            let data = std::fs::read_to_string(path)
                .with_context(|| format!("Không đọc được file cấu hình {:?}", path))?;
            serde_json::from_str::<NormalizerConfig>(&data)
                .with_context(|| format!("Cấu hình không hợp lệ trong {:?}", path))?
        }
        None => NormalizerConfig::default(),
    };

    let dataset = Dataset::from_csv_path(&args.input)
        .with_context(|| format!("Không đọc được file {:?}", args.input))?;

    let output = match &args.name {
        None => serde_json::to_value(dataset.roster())?,
        Some(name) => {
            let raw = dataset.find_by_name(name)?;
            let record = dataset.patient_details(name, &config)?;
            tracing::info!(
                events = record.events().len(),
                alerts = record.alerts().len(),
                "Normalized patient record"
            );
            if args.insights {
                serde_json::to_value(augment(record, raw, &OfflineInsights))?
            } else {
                serde_json::to_value(record)?
            }
        }
    };

    let rendered = if args.pretty {
        serde_json::to_string_pretty(&output)?
    } else {
        serde_json::to_string(&output)?
    };
    println!("{rendered}");

    Ok(())
}
