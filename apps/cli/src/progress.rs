use std::io::{self, IsTerminal, Stderr, Write};
use std::sync::atomic::{AtomicBool, Ordering::Relaxed};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use ona_ingest::IngestEvent;
use ona_transfer::{Progress, SpeedCalculator};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;
use tracing_subscriber::fmt::MakeWriter;

// ---------------------------------------------------------------------------
// Shared state between the progress line and the tracing writer
// ---------------------------------------------------------------------------

/// True while a transfer progress line is on screen.
static PROGRESS_ACTIVE: AtomicBool = AtomicBool::new(false);

/// Serializes progress redraws and log writes.
static TERMINAL_LOCK: Mutex<()> = Mutex::new(());

fn acquire_terminal_lock() -> MutexGuard<'static, ()> {
    TERMINAL_LOCK.lock().unwrap_or_else(|e| e.into_inner())
}

/// Erases the progress line on `out` when one is shown on a terminal.
fn clear_line<W: Write>(out: &mut W, active: bool, terminal: bool) -> io::Result<()> {
    if active && terminal {
        out.write_all(b"\r\x1b[2K")?;
        out.flush()?;
    }
    Ok(())
}

/// A [`MakeWriter`] that clears the stdout progress line before each log
/// event is written to stderr.
pub(crate) struct ProgressAwareStderr;

/// Holds the terminal lock for the whole of one log write.
pub(crate) struct ProgressWriter {
    _guard: MutexGuard<'static, ()>,
    inner: Stderr,
}

impl Write for ProgressWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

impl<'a> MakeWriter<'a> for ProgressAwareStderr {
    type Writer = ProgressWriter;

    fn make_writer(&'a self) -> Self::Writer {
        let guard = acquire_terminal_lock();
        let mut stdout = io::stdout();
        let terminal = stdout.is_terminal();
        let _ = clear_line(&mut stdout, PROGRESS_ACTIVE.load(Relaxed), terminal);
        ProgressWriter {
            _guard: guard,
            inner: io::stderr(),
        }
    }
}

// ---------------------------------------------------------------------------
// Transfer progress renderer
// ---------------------------------------------------------------------------

/// Draws one `\r`-refreshed line per transferred file on stdout.
pub(crate) struct TransferProgressRenderer {
    file: String,
    index: usize,
    total: usize,
    speed: SpeedCalculator,
    last_line_len: usize,
    drawing: bool,
}

impl TransferProgressRenderer {
    pub(crate) fn new() -> Self {
        Self {
            file: String::new(),
            index: 0,
            total: 0,
            speed: SpeedCalculator::new(Some(Duration::from_secs(5)), None),
            last_line_len: 0,
            drawing: false,
        }
    }

    /// Consumes `events` on a background task until the sender is dropped.
    pub(crate) fn spawn(mut self, mut events: UnboundedReceiver<IngestEvent>) -> JoinHandle<()> {
        tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                self.on_event(event);
            }
            self.end_line();
        })
    }

    pub(crate) fn on_event(&mut self, event: IngestEvent) {
        match event {
            IngestEvent::TransferStarted {
                file, index, total, ..
            } => {
                self.end_line();
                self.file = file;
                self.index = index;
                self.total = total;
                self.speed.reset();
            }
            IngestEvent::Progress { progress, .. } => {
                self.speed.record(progress.offset);
                let line = format_line(
                    &self.file,
                    self.index,
                    self.total,
                    progress,
                    self.speed.bytes_per_second(),
                    self.speed.eta(progress.remaining()),
                );
                self.draw(&line);
            }
            IngestEvent::TransferFinished { .. } => self.end_line(),
            IngestEvent::StatusPolled { job_id, status } => {
                self.end_line();
                let _guard = acquire_terminal_lock();
                println!("Job {job_id}: {status}");
            }
            IngestEvent::JobCreated { .. } => {}
        }
    }

    fn draw(&mut self, line: &str) {
        let len = line.chars().count();
        let pad = self.last_line_len.saturating_sub(len);
        {
            let _guard = acquire_terminal_lock();
            print!("\r{line}{}", " ".repeat(pad));
            let _ = io::stdout().flush();
        }
        PROGRESS_ACTIVE.store(true, Relaxed);
        self.last_line_len = len;
        self.drawing = true;
    }

    fn end_line(&mut self) {
        if !self.drawing {
            return;
        }
        {
            let _guard = acquire_terminal_lock();
            println!();
        }
        PROGRESS_ACTIVE.store(false, Relaxed);
        self.drawing = false;
        self.last_line_len = 0;
    }
}

fn format_line(
    file: &str,
    index: usize,
    total: usize,
    progress: Progress,
    bytes_per_second: f64,
    eta: Option<Duration>,
) -> String {
    let eta = eta
        .filter(|_| !progress.finished)
        .map(|d| format!("  ETA {}", format_duration(d)))
        .unwrap_or_default();
    format!(
        "[{}/{}] {file} {:5.1}%  {} / {}  {}/s{eta}",
        index + 1,
        total.max(1),
        progress.percentage(),
        format_bytes(progress.offset),
        format_bytes(progress.size),
        format_bytes(bytes_per_second as u64),
    )
}

pub(crate) fn format_bytes(bytes: u64) -> String {
    const KIB: u64 = 1024;
    const MIB: u64 = KIB * 1024;
    const GIB: u64 = MIB * 1024;

    if bytes >= GIB {
        format!("{:.2} GiB", bytes as f64 / GIB as f64)
    } else if bytes >= MIB {
        format!("{:.2} MiB", bytes as f64 / MIB as f64)
    } else if bytes >= KIB {
        format!("{:.2} KiB", bytes as f64 / KIB as f64)
    } else {
        format!("{bytes} B")
    }
}

fn format_duration(d: Duration) -> String {
    let secs = d.as_secs();
    if secs >= 3600 {
        format!("{}:{:02}:{:02}", secs / 3600, secs / 60 % 60, secs % 60)
    } else {
        format!("{}:{:02}", secs / 60, secs % 60)
    }
}
