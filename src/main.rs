use clap::{Parser, ValueEnum};
use colored::Colorize;
use crossbeam_utils::Backoff;
use std::fmt;
use std::process::ExitCode;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use threadsafe_containers::{init_tracing, Concurrent, Discipline, Fifo, Lifo};

/// Value that tells a consumer to stop. Producers only push positive values.
const SENTINEL: i64 = -1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ContainerKind {
    /// FIFO queue; producers and consumers run at the same time
    Queue,
    /// LIFO stack; filled first, then drained
    Stack,
}

/// Command-line arguments for the producer/consumer demo
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Container the values travel through
    #[arg(short, long, value_enum, default_value_t = ContainerKind::Queue)]
    container: ContainerKind,

    /// Number of producer threads
    #[arg(short, long, default_value_t = 1)]
    producers: u32,

    /// Number of consumer threads
    #[arg(long, default_value_t = 4)]
    consumers: u32,

    /// Values pushed by each producer
    #[arg(short, long, default_value_t = 1000)]
    items: u32,

    /// Consumers poll with try_pop and back off instead of blocking
    #[arg(long)]
    polling: bool,

    /// Print every value as it is received
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug)]
enum DemoError {
    /// A producer or consumer thread panicked
    WorkerPanicked(&'static str),
    /// The received values are not exactly the pushed ones
    Mismatch { missing: usize, duplicated: usize },
}

impl fmt::Display for DemoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WorkerPanicked(role) => write!(f, "a {role} thread panicked"),
            Self::Mismatch { missing, duplicated } => {
                write!(f, "{missing} values missing, {duplicated} values received twice")
            }
        }
    }
}

impl std::error::Error for DemoError {}

/// Outcome of one pipeline run
struct Report {
    received: usize,
    per_consumer: Vec<usize>,
    elapsed: Duration,
}

fn main() -> ExitCode {
    init_tracing();
    let args = Args::parse();

    println!("{}", "Concurrent Container Demonstration".green().bold());
    println!("=====================================\n");

    let result = match args.container {
        ContainerKind::Queue => run_pipeline::<Fifo>(&args),
        ContainerKind::Stack => run_pipeline::<Lifo>(&args),
    };

    match result {
        Ok(report) => {
            print_report(&args, &report);
            println!("\n{}", "Demonstration complete!".green().bold());
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{} {err}", "error:".red().bold());
            ExitCode::FAILURE
        }
    }
}

/// Pushes `items` values from every producer, plus one sentinel per
/// consumer, and checks that each value is received exactly once.
///
/// A LIFO container would hand the sentinels out before the data, so for
/// stacks the sentinels go in first and the consumers start only once the
/// producers are done.
fn run_pipeline<D: Discipline + 'static>(args: &Args) -> Result<Report, DemoError> {
    let container = Arc::new(Concurrent::<i64, D>::new());
    let fill_then_drain = args.container == ContainerKind::Stack;
    let start = Instant::now();

    println!(
        "{}",
        format!(
            "Running {} producer(s) x {} item(s) through a {} with {} consumer(s)...",
            args.producers,
            args.items,
            D::NAME,
            args.consumers
        )
        .yellow()
        .bold()
    );

    if fill_then_drain {
        push_sentinels(&container, args.consumers);
    }

    let producers: Vec<_> = (0..args.producers)
        .map(|id| {
            let container = Arc::clone(&container);
            let items = args.items;
            thread::spawn(move || produce(&container, id, items))
        })
        .collect();

    let mut consumers = Vec::new();
    if !fill_then_drain {
        consumers = spawn_consumers(&container, args);
    }

    join_all(producers, "producer")?;

    if fill_then_drain {
        consumers = spawn_consumers(&container, args);
    } else {
        push_sentinels(&container, args.consumers);
    }

    let batches = join_all(consumers, "consumer")?;
    let elapsed = start.elapsed();

    let per_consumer = batches.iter().map(Vec::len).collect();
    let mut received: Vec<i64> = batches.into_iter().flatten().collect();
    verify(&mut received, args)?;

    Ok(Report {
        received: received.len(),
        per_consumer,
        elapsed,
    })
}

fn produce<D: Discipline>(container: &Concurrent<i64, D>, id: u32, items: u32) {
    let base = i64::from(id) * i64::from(items);
    for offset in 1..=i64::from(items) {
        container.push(base + offset);
    }
}

fn push_sentinels<D: Discipline>(container: &Concurrent<i64, D>, count: u32) {
    for _ in 0..count {
        container.push(SENTINEL);
    }
}

fn spawn_consumers<D: Discipline + 'static>(
    container: &Arc<Concurrent<i64, D>>,
    args: &Args,
) -> Vec<JoinHandle<Vec<i64>>> {
    (0..args.consumers)
        .map(|id| {
            let container = Arc::clone(container);
            let (polling, verbose) = (args.polling, args.verbose);
            thread::spawn(move || consume(&container, id, polling, verbose))
        })
        .collect()
}

/// Receives values until the sentinel arrives.
fn consume<D: Discipline>(
    container: &Concurrent<i64, D>,
    id: u32,
    polling: bool,
    verbose: bool,
) -> Vec<i64> {
    let mut received = Vec::new();
    let backoff = Backoff::new();

    loop {
        let value = if polling {
            if let Some(value) = container.try_pop() {
                backoff.reset();
                value
            } else {
                backoff.snooze();
                continue;
            }
        } else {
            container.wait_and_pop()
        };

        if value == SENTINEL {
            if verbose {
                println!("{}", format!("Consumer {id}: got sentinel, stopping").blue());
            }
            return received;
        }
        if verbose {
            println!("{}", format!("Consumer {id}: received {value}").blue());
        }
        received.push(value);
    }
}

fn join_all<R>(handles: Vec<JoinHandle<R>>, role: &'static str) -> Result<Vec<R>, DemoError> {
    handles
        .into_iter()
        .map(|handle| handle.join().map_err(|_| DemoError::WorkerPanicked(role)))
        .collect()
}

/// Checks that `received` holds every value in `1..=producers * items`
/// exactly once. Sorts `received` in place.
fn verify(received: &mut Vec<i64>, args: &Args) -> Result<(), DemoError> {
    let expected = i64::from(args.producers) * i64::from(args.items);
    received.sort_unstable();

    let total = received.len();
    let mut distinct = received.clone();
    distinct.dedup();
    let duplicated = total - distinct.len();
    let missing = (1..=expected)
        .filter(|value| distinct.binary_search(value).is_err())
        .count();

    if missing == 0 && duplicated == 0 {
        Ok(())
    } else {
        Err(DemoError::Mismatch { missing, duplicated })
    }
}

fn print_report(args: &Args, report: &Report) {
    println!(
        "{}",
        format!(
            "Received all {} values exactly once in {:?}",
            report.received, report.elapsed
        )
        .green()
    );
    for (id, count) in report.per_consumer.iter().enumerate() {
        println!("  consumer {id}: {count} value(s)");
    }
    if args.polling {
        println!("Consumers polled with try_pop and backoff");
    } else {
        println!("Consumers blocked in wait_and_pop");
    }
}
