use std::io::Write;

use anstyle::{AnsiColor, Color, RgbColor, Style};

/// 初始化全局 logger，默认级别 Info，可通过 `RUST_LOG` 覆盖
///
/// 重复调用是安全的，只有第一次生效。
pub fn init_log() {
    init_log_with_level(log::LevelFilter::Info);
}

pub fn init_log_with_level(default_level: log::LevelFilter) {
    let result = env_logger::Builder::new()
        .format(|buf, record| {
            let level_style = level_style(record.level());
            let grey_style = Style::new().fg_color(Some(Color::Rgb(RgbColor(110, 110, 110))));

            let line = record.line().unwrap_or(!0);
            let file = record.file().unwrap_or("").rsplit(['\\', '/']).next().unwrap_or("");
            let time = chrono::Local::now().format("%H:%M:%S");
            let level = record.level();

            writeln!(
                buf,
                "{level_style}[{time}] {level:<5}{level_style:#} {grey_style}[{file}:{line}]{grey_style:#} {}",
                record.args()
            )
        })
        .filter(None, default_level)
        .parse_default_env()
        .try_init();

    if let Err(e) = result {
        log::debug!("logger already initialized: {}", e);
    }
}

fn level_style(level: log::Level) -> Style {
    let color = match level {
        log::Level::Error => AnsiColor::Red,
        log::Level::Warn => AnsiColor::Yellow,
        log::Level::Info => AnsiColor::Green,
        log::Level::Debug => AnsiColor::Cyan,
        log::Level::Trace => AnsiColor::BrightBlack,
    };
    Style::new().fg_color(Some(Color::Ansi(color))).bold()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_twice() {
        init_log();
        init_log_with_level(log::LevelFilter::Trace);
        log::info!("logger ready");
    }
}
