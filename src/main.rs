//main.rs
use clap::{Parser, ValueEnum};
use env_logger::Env;
use lloyd_linkage::{compare, AverageLinkage, DataSet, Delimiter, KMeans, LinkageMetric};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Algorithm {
    Kmeans,
    Average,
    /// Run both and report their pairwise disagreement
    Hamming,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Metric {
    Euclidean,
    Manhattan,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Sep {
    Whitespace,
    Tab,
    Comma,
}

#[derive(Parser)]
#[clap(version = "0.1.0", about = "k-means and average-linkage clustering")]
struct Opts {
    /// whitespace or tab delimited numeric rows, one point per line
    #[clap(short, long)]
    file: String,

    #[clap(short, long)]
    k: usize,

    #[clap(short, long, value_enum)]
    algorithm: Algorithm,

    #[clap(long, default_value_t = 100)]
    restarts: usize,

    #[clap(long)]
    seed: Option<u64>,

    /// point distance inside average linkage
    #[clap(long, value_enum, default_value = "euclidean")]
    metric: Metric,

    #[clap(long, value_enum, default_value = "whitespace")]
    delimiter: Sep,

    /// run k-means restarts on a single thread
    #[clap(long)]
    sequential: bool,

    /// optional file receiving the label vector, one label per line
    #[clap(short, long)]
    outfile: Option<String>,
}

fn format_labels(name: &str, labels: &[usize]) -> String {
    let joined = labels.iter().map(|l| l.to_string()).collect::<Vec<_>>().join(",");
    format!("{} = [{}]", name, joined)
}

fn write_labels(path: &str, labels: &[usize]) -> anyhow::Result<()> {
    std::fs::write(path, labels.iter().map(|c| c.to_string()).collect::<Vec<_>>().join("\n"))?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::init_from_env(Env::default().filter_or("RUST_LOG", "info"));
    let opts = Opts::parse();

    let delimiter = match opts.delimiter {
        Sep::Tab => Delimiter::Tab,
        Sep::Whitespace => Delimiter::Whitespace,
        Sep::Comma => Delimiter::Comma,
    };
    let ds = DataSet::from_delimited(&opts.file, delimiter)?;
    log::info!("Loaded {} points of dimension {}", ds.n_points(), ds.dim());

    let mut kmeans = KMeans::new(opts.k)
        .restarts(opts.restarts)
        .parallel(!opts.sequential);
    if let Some(seed) = opts.seed {
        kmeans = kmeans.seed(seed);
    }
    let metric = match opts.metric {
        Metric::Euclidean => LinkageMetric::Euclidean,
        Metric::Manhattan => LinkageMetric::Manhattan,
    };
    let linkage = AverageLinkage::new(opts.k).metric(metric);

    let labels = match opts.algorithm {
        Algorithm::Kmeans => {
            let result = kmeans.fit(&ds)?;
            let labels = result.labels()?;
            println!("{}", result.cost);
            println!("{}", format_labels("A", &labels));
            labels
        }
        Algorithm::Average => {
            let labels = linkage.fit(&ds)?.labels()?;
            println!("{}", format_labels("B", &labels));
            labels
        }
        Algorithm::Hamming => {
            let cmp = compare(&ds, &kmeans, &linkage)?;
            println!("{}", format_labels("A", &cmp.kmeans_labels));
            println!("{}", format_labels("B", &cmp.linkage_labels));
            println!("{}", cmp.disagreement);
            cmp.kmeans_labels
        }
    };

    if let Some(path) = &opts.outfile {
        write_labels(path, &labels)?;
    }

    Ok(())
}
