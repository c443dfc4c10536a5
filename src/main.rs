use anyhow::{bail, Result};
use scimine::{Miner, Source};

const DATA_ROOT: &str = "./data";
const OUTPUT_ROOT: &str = "./output";

fn usage() -> ! {
    eprintln!("usage: scimine mine <stackoverflow|reddit|scopus> <query...>");
    eprintln!("       scimine analyze <stackoverflow|reddit|scopus> [extra stop words...]");
    eprintln!();
    eprintln!("examples:");
    eprintln!("  scimine mine stackoverflow machine learning");
    eprintln!("  scimine mine reddit MachineLearning");
    eprintln!("  scimine mine scopus \"TITLE(machine learning) AND PUBYEAR > 2021\"");
    eprintln!("  scimine analyze scopus new custom words");
    std::process::exit(2);
}

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.len() < 2 {
        usage();
    }
    let Some(source) = Source::parse(&args[1]) else { usage() };
    let rest: Vec<&str> = args[2..].iter().map(String::as_str).collect();

    let miner = Miner::new().data_dir(DATA_ROOT).output_dir(OUTPUT_ROOT).progress(true);

    match args[0].as_str() {
        "mine" => {
            if rest.is_empty() {
                usage();
            }
            let query = rest.join(" ");
            let summary = match source {
                Source::StackOverflow => miner.mine_stackoverflow(&query)?,
                Source::Reddit => miner.mine_reddit(&query)?,
                Source::Scopus => miner.mine_scopus(&query)?,
            };
            println!(
                "Mined {} record(s), kept {} after cleaning -> {}",
                summary.fetched,
                summary.kept,
                summary.table_path.display()
            );
            if let Some(total) = summary.reported_total {
                println!("Source reported {} total match(es)", total);
            }
        }
        "analyze" => {
            let outputs = miner.analyze(source, &rest)?;
            println!(
                "Analyzed {} document(s); best model: {} topics, decay {}",
                outputs.n_documents, outputs.best_n_topics, outputs.best_decay
            );
            println!("Wrote {} file(s) under {}", outputs.files.len(), outputs.output_dir.display());
        }
        _ => bail!("unknown command {:?}", args[0]),
    }
    Ok(())
}
