mod lcd;
mod led;
mod mode;
#[cfg(test)]
mod test_support;
mod transport;

use std::os::unix::net::UnixStream;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::Parser;
use env_logger::Env;
use log::{info, warn};

use soze_core::color::{BLACK, BLUE, GREEN, RED};
use soze_core::protocol::Command;
use soze_core::Color;

use crate::lcd::{Lcd, DEFAULT_HEIGHT, DEFAULT_WIDTH};
use crate::led::Led;
use crate::mode::{LcdMode, LcdModeName, LcdSettings, LedMode, LedModeName, LedSettings};
use crate::transport::{SerialConfig, SerialTransport};

#[derive(Parser)]
#[command(name = "soze-lcd", about = "Drive a serial character LCD and RGB LED strip")]
struct Cli {
    /// Serial device of the LCD controller
    #[arg(long)]
    lcd_port: Option<String>,

    /// Serial device of the LED controller
    #[arg(long)]
    led_port: Option<String>,

    /// Send LCD output to a soze-mock socket instead of a serial device
    #[arg(long, conflicts_with = "lcd_port")]
    mock: Option<PathBuf>,

    /// Display width in characters
    #[arg(long, default_value_t = DEFAULT_WIDTH)]
    width: u8,

    /// Display height in lines
    #[arg(long, default_value_t = DEFAULT_HEIGHT)]
    height: u8,

    /// Milliseconds between updates
    #[arg(long, default_value_t = 100)]
    tick_ms: u64,

    /// Stop after this many updates (runs forever if omitted)
    #[arg(long)]
    ticks: Option<u64>,

    #[arg(long, value_enum, default_value_t = LedModeName::Static)]
    led_mode: LedModeName,

    /// Color for the static LED mode (hex, e.g. ff8800)
    #[arg(long, default_value = "ffffff")]
    led_color: Color,

    /// Color in the fade cycle; repeat to add more
    #[arg(long = "fade-color")]
    fade_colors: Vec<Color>,

    /// Seconds spent fading between two colors
    #[arg(long, default_value_t = 5.0)]
    fade_time: f64,

    #[arg(long, value_enum, default_value_t = LcdModeName::Clock)]
    lcd_mode: LcdModeName,

    /// LCD backlight color
    #[arg(long, default_value = "ffffff")]
    lcd_color: Color,

    /// LCD brightness, sent once at startup
    #[arg(long)]
    brightness: Option<u8>,

    /// LCD contrast, sent once at startup
    #[arg(long)]
    contrast: Option<u8>,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let fade_time = Duration::try_from_secs_f64(cli.fade_time)
        .with_context(|| format!("invalid fade time {}", cli.fade_time))?;
    let fade_colors = if cli.fade_colors.is_empty() {
        vec![RED, GREEN, BLUE]
    } else {
        cli.fade_colors.clone()
    };
    let mut led_mode = LedMode::from_name(
        cli.led_mode,
        &LedSettings {
            static_color: cli.led_color,
            fade_colors,
            fade_time,
        },
    )?;
    let lcd_mode = LcdMode::from_name(cli.lcd_mode, &LcdSettings { color: cli.lcd_color });

    let mut lcd = open_lcd(&cli)?;
    let mut led = open_led(&cli)?;

    if let Some(lcd) = lcd.as_mut() {
        let mut setup = Vec::new();
        setup.extend(cli.brightness.map(Command::Brightness));
        setup.extend(cli.contrast.map(Command::Contrast));
        if !setup.is_empty() {
            lcd.send(&setup);
        }
    }

    if lcd.is_none() && led.is_none() {
        warn!("no LCD or LED device configured, nothing to drive");
    }

    let tick = Duration::from_millis(cli.tick_ms);
    let start = Instant::now();
    let mut count = 0u64;

    loop {
        if cli.ticks.is_some_and(|n| count >= n) {
            break;
        }
        let tick_start = Instant::now();

        if let Some(led) = led.as_mut() {
            led.set_color(led_mode.color(start.elapsed()));
        }
        if let Some(lcd) = lcd.as_mut() {
            let lines = lcd_mode.text(chrono::Local::now().time());
            lcd.update(lcd_mode.color(), &lines);
        }
        count += 1;

        if let Some(remaining) = tick.checked_sub(tick_start.elapsed()) {
            std::thread::sleep(remaining);
        }
    }

    info!("stopping after {count} updates");
    if let Some(led) = led.as_mut() {
        led.set_color(BLACK);
        led.close();
    }
    if let Some(lcd) = lcd.as_mut() {
        lcd.close();
    }
    Ok(())
}

fn open_lcd(cli: &Cli) -> anyhow::Result<Option<Lcd>> {
    let mut transport = SerialTransport::new("lcd", SerialConfig::default());

    if let Some(socket) = &cli.mock {
        let stream = UnixStream::connect(socket)
            .with_context(|| format!("failed to connect to {}", socket.display()))?;
        info!("lcd: using mock display at {}", socket.display());
        transport.attach(stream);
        let mut lcd = Lcd::new(transport, cli.width, cli.height);
        lcd.start()?;
        return Ok(Some(lcd));
    }

    let Some(port) = &cli.lcd_port else {
        return Ok(None);
    };
    transport.set_path(port);
    let mut lcd = Lcd::new(transport, cli.width, cli.height);
    lcd.open()?;
    Ok(Some(lcd))
}

fn open_led(cli: &Cli) -> anyhow::Result<Option<Led>> {
    let Some(port) = &cli.led_port else {
        return Ok(None);
    };
    let mut transport = SerialTransport::new("led", SerialConfig::default());
    transport.set_path(port);
    let mut led = Led::new(transport);
    led.open()?;
    Ok(Some(led))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn cli_defaults() {
        let cli = Cli::parse_from(["soze-lcd"]);
        assert_eq!(cli.width, 20);
        assert_eq!(cli.height, 4);
        assert_eq!(cli.led_mode, LedModeName::Static);
        assert_eq!(cli.lcd_mode, LcdModeName::Clock);
        assert_eq!(cli.lcd_color, Color::new(255, 255, 255));
        assert!(cli.fade_colors.is_empty());
    }

    #[test]
    fn cli_parses_colors_and_modes() {
        let cli = Cli::parse_from([
            "soze-lcd",
            "--led-mode",
            "fade",
            "--fade-color",
            "ff0000",
            "--fade-color",
            "#0000ff",
            "--fade-time",
            "2.5",
        ]);
        assert_eq!(cli.led_mode, LedModeName::Fade);
        assert_eq!(cli.fade_colors, vec![RED, BLUE]);
        assert_eq!(cli.fade_time, 2.5);
    }

    #[test]
    fn mock_conflicts_with_lcd_port() {
        let res = Cli::try_parse_from(["soze-lcd", "--mock", "/tmp/x.sock", "--lcd-port", "/dev/ttyUSB0"]);
        assert!(res.is_err());
    }
}
