use hostpulse::probe;
use std::io::BufRead;

#[tokio::main]
async fn main() {
    let arg = std::env::args().nth(1);
    match probe::parse_port(arg.as_deref()) {
        Some(port) => {
            if let Err(e) = start(port).await {
                println!("{}", e);
            }
        }
        None => {
            println!("Invalid Port! Please restart the program.");
            println!(
                "Port should be set between {}~{}.",
                probe::MIN_PORT,
                u16::MAX
            );
        }
    }
    println!("The program has ended.");
}

async fn start(port: u16) -> anyhow::Result<()> {
    let stream = probe::connect(port).await?;

    println!();
    println!("Please enter message to continue the procedure:");
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;

    probe::run(stream, line.trim_end()).await?;
    Ok(())
}
