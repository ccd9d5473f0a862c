use std::thread;
use std::time::Duration;

use clap::Parser;
use console::{style, Color};
use pollbar::{CancelToken, Indicator, IndicatorState, Poller};

/// Three dancers join one by one, speed up, then get canceled.
#[derive(Debug, Parser)]
struct Cli {
    /// Redraw interval in milliseconds
    #[arg(long, default_value_t = 100)]
    interval: u64,
    /// Seconds between each stage of the demo
    #[arg(long, default_value_t = 2)]
    stage: u64,
}

const WIDTH: usize = 20;

fn dash() -> impl FnMut(&IndicatorState) -> String + Send {
    let mut forward = true;
    let mut step = 0;
    move |_| {
        let frame = match (forward, step) {
            (true, 0) => "┏( ^o^)┛".to_string(),
            (true, n) => format!("{}三┏( ^o^)┛", "　".repeat(n - 1)),
            (false, 0) => format!("{}┗(^o^ )┓", "　".repeat(WIDTH)),
            (false, n) => format!("{}┗(^o^ )┓三", "　".repeat(WIDTH - n)),
        };
        if step >= WIDTH {
            forward = !forward;
            step = 0;
        } else {
            step += 1;
        }
        frame
    }
}

fn wave() -> impl FnMut(&IndicatorState) -> String + Send {
    let blocks = [
        style("▂").cyan(),
        style("▅").magenta(),
        style("▇").blue(),
        style("▇").yellow(),
        style("▓").green(),
        style("▒").red(),
        style("░"),
    ];
    let wave = blocks
        .iter()
        .chain(blocks.iter().rev().skip(1).take(blocks.len() - 2))
        .map(|block| block.to_string())
        .collect::<Vec<_>>();
    let mut start = 0;

    move |_| {
        let len = wave.len();
        let left = (0..len).map(|i| wave[(start + i) % len].as_str());
        let right = (0..len).map(|i| wave[len - 1 - (start + i) % len].as_str());
        let line = left
            .chain(Some(" ('ω')"))
            .chain(right)
            .collect::<String>();
        start = (start + 1) % len;
        line
    }
}

fn rainbow() -> impl FnMut(&IndicatorState) -> String + Send {
    const COLORS: [Color; 6] = [
        Color::Cyan,
        Color::Magenta,
        Color::Blue,
        Color::Yellow,
        Color::Green,
        Color::Red,
    ];
    const FRAMES: [&str; 4] = [
        "ﾌﾟｷﾞｬｰｰｰｰｰｰｰm9(^Д^)9mｰｰｰｰｰｰｰｰ",
        "ﾌﾟｷﾞｬｰｰｰｰｰｰm9(^Д^)9mｰｰｰｰｰｰｰｰｰ",
        "ﾌﾟｷﾞｬｰｰｰｰｰｰｰm9(^Д^)9mｰｰｰｰｰｰｰｰ",
        "ﾌﾟｷﾞｬｰｰｰｰｰｰｰｰm9(^Д^)9mｰｰｰｰｰｰｰ",
    ];
    let mut tick = 0;

    move |_| {
        tick += 1;
        FRAMES[tick % FRAMES.len()]
            .chars()
            .enumerate()
            .map(|(j, c)| style(c).fg(COLORS[(tick + j) % COLORS.len()]).to_string())
            .collect()
    }
}

fn advance_every(indicator: Indicator, every: Duration) {
    thread::spawn(move || loop {
        indicator.advance();
        thread::sleep(every);
    });
}

fn main() {
    let cli = Cli::parse();
    let stage = Duration::from_secs(cli.stage);

    let dancers = [
        (Indicator::new(u64::MAX, dash()), 30),
        (Indicator::new(u64::MAX, wave()), 20),
        (Indicator::new(u64::MAX, rainbow()), 40),
    ];
    for (indicator, ms) in &dancers {
        advance_every(indicator.clone(), Duration::from_millis(*ms));
    }

    let poller = Poller::new(Duration::from_millis(cli.interval));
    poller.add(dancers[0].0.clone());

    let cancel = CancelToken::new();
    {
        let poller = poller.clone();
        let cancel = cancel.clone();
        let late = [dancers[1].0.clone(), dancers[2].0.clone()];
        thread::spawn(move || {
            for indicator in late {
                thread::sleep(stage);
                poller.add(indicator);
            }

            thread::sleep(stage);
            poller.set_interval(Duration::from_millis(cli.interval / 10));

            thread::sleep(stage);
            cancel.cancel();
        });
    }

    match poller.show(&cancel) {
        Ok(()) | Err(pollbar::Error::Canceled) => {}
        Err(err) => eprintln!("error: {err}"),
    }
}
