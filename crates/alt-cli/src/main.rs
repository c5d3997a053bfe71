//! `alttext` binary

#[tokio::main]
async fn main() {
    let code = match alt_cli::run(std::env::args_os()).await {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error: {error:#}");
            1
        }
    };
    std::process::exit(code);
}
