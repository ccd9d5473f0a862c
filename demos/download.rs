use std::thread;
use std::time::Duration;

use pollbar::{CancelToken, Indicator, Poller, Template};
use rand::Rng;

fn main() {
    let template = Template::new("[{bar:40}] {pos}/{target} {percent}%").unwrap();
    let poller = Poller::new(Duration::from_millis(50));

    let workers = (0..4)
        .map(|_| {
            let total = rand::rng().random_range(50..200);
            let file = poller.add(Indicator::with_template(total, template.clone()));
            thread::spawn(move || {
                let mut rng = rand::rng();
                for _ in 0..total {
                    file.advance();
                    thread::sleep(Duration::from_millis(rng.random_range(5..30)));
                }
            })
        })
        .collect::<Vec<_>>();

    if let Err(err) = poller.show(&CancelToken::new()) {
        eprintln!("error: {err}");
    }
    for worker in workers {
        let _ = worker.join();
    }
    println!("all downloads finished");
}
