mod render;
mod screen;
mod socket;

use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::mpsc::{self, TryRecvError};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal;
use env_logger::Env;
use log::info;

use soze_core::Decoder;

use crate::render::{render_screen, status_line};
use crate::screen::Screen;
use crate::socket::{bind_listener, SocketReceiver};

#[derive(Parser)]
#[command(name = "soze-mock", about = "Terminal stand-in for a serial character LCD")]
struct Cli {
    /// Unix socket the driver connects to
    #[arg(short, long, default_value = "/tmp/soze_lcd.sock")]
    socket: PathBuf,

    /// Display width in characters, until the driver sends its own size
    #[arg(long, default_value_t = 20)]
    width: u8,

    /// Display height in lines, until the driver sends its own size
    #[arg(long, default_value_t = 4)]
    height: u8,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let listener = bind_listener(&cli.socket)?;
    info!("waiting for a driver on {} ...", cli.socket.display());
    let (stream, _addr) = listener.accept().context("accepting connection")?;
    info!("driver connected");

    let mut receiver = SocketReceiver::new(stream);

    let mut stdout = io::stdout();
    terminal::enable_raw_mode().context("enable raw mode")?;
    crossterm::execute!(
        stdout,
        terminal::EnterAlternateScreen,
        terminal::Clear(terminal::ClearType::All),
        crossterm::cursor::Hide
    )
    .context("enter alt screen")?;

    let orig_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = terminal::disable_raw_mode();
        let _ = crossterm::execute!(
            io::stdout(),
            crossterm::cursor::Show,
            terminal::LeaveAlternateScreen
        );
        orig_hook(info);
    }));

    let (tx, rx) = mpsc::channel::<Vec<u8>>();
    thread::spawn(move || loop {
        match receiver.recv() {
            Ok(Some(chunk)) => {
                if tx.send(chunk).is_err() {
                    break;
                }
            }
            Ok(None) => break,
            Err(_) => break,
        }
    });

    let result = display_loop(&cli, &rx, &mut stdout);

    let _ = terminal::disable_raw_mode();
    let _ = crossterm::execute!(
        stdout,
        crossterm::cursor::Show,
        terminal::LeaveAlternateScreen
    );
    let _ = std::fs::remove_file(&cli.socket);

    result
}

/// Apply incoming bytes to the virtual screen and redraw whenever it
/// changes. Runs until the user quits; the last picture stays up after the
/// driver disconnects.
fn display_loop(cli: &Cli, rx: &mpsc::Receiver<Vec<u8>>, stdout: &mut io::Stdout) -> Result<()> {
    let mut screen = Screen::new(cli.width, cli.height);
    let mut decoder = Decoder::new(cli.width, cli.height);
    let mut render_buf = Vec::with_capacity(cli.width as usize * cli.height as usize * 8);
    let mut connected = true;
    let mut dirty = true;
    let mut drawn_size = (cli.width, cli.height);
    // Logging would scribble over the alternate screen, so errors go to the
    // status line
    let mut last_error: Option<String> = None;

    loop {
        if event::poll(Duration::from_millis(10)).context("polling events")? {
            if let Event::Key(KeyEvent {
                code, modifiers, ..
            }) = event::read().context("reading event")?
            {
                match code {
                    KeyCode::Char('q') | KeyCode::Esc => break,
                    KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => break,
                    _ => {}
                }
            }
        }

        loop {
            match rx.try_recv() {
                Ok(chunk) => {
                    if let Some(e) = apply_chunk(&mut decoder, &mut screen, &chunk) {
                        last_error = Some(e);
                    }
                    dirty = true;
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    if connected {
                        connected = false;
                        dirty = true;
                    }
                    break;
                }
            }
        }

        if dirty {
            let size = (screen.width(), screen.height());
            if size != drawn_size {
                stdout.write_all(b"\x1b[2J")?;
                drawn_size = size;
            }
            let status = status_line(&screen, connected, last_error.as_deref());
            render_screen(&screen, 2, 3, &status, &mut render_buf);
            stdout.write_all(&render_buf)?;
            stdout.flush()?;
            dirty = false;
        }
    }

    Ok(())
}

/// Decode `chunk` onto `screen`. Returns the last decode error, if any.
fn apply_chunk(decoder: &mut Decoder, screen: &mut Screen, chunk: &[u8]) -> Option<String> {
    decoder.push(chunk);
    let mut error = None;
    while let Some(event) = decoder.next_event() {
        match event {
            Ok(event) => screen.apply(&event),
            Err(e) => error = Some(e.to_string()),
        }
    }
    error
}
