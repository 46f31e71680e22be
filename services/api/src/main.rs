use grade_sim_api::run;

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("grade simulator error: {err}");
        std::process::exit(1);
    }
}
