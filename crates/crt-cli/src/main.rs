//! Thin CLI over the `crt` facade: enough to exercise `get_object`,
//! `put_object`, and the CBOR codec from a shell without writing Rust.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use crt::config::{Config, RawConfig};
use crt::s3::{DefaultCredentialsProvider, GetObjectOptions, PutBody, PutObjectOptions, S3Client};

#[derive(Parser)]
#[command(name = "crt", about = "High-throughput S3 transfer and CBOR codec CLI")]
struct Cli {
	/// Path to a JSON config document overriding the built-in defaults.
	#[arg(long, global = true)]
	config: Option<PathBuf>,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand)]
enum Command {
	/// Download an object, splitting into parts above the multipart threshold.
	Get {
		bucket: String,
		key: String,
		/// Write the body here instead of printing a summary to stdout.
		#[arg(long)]
		out: Option<PathBuf>,
	},
	/// Upload a file, splitting into parts above the multipart threshold.
	Put {
		bucket: String,
		key: String,
		file: PathBuf,
	},
	/// Decode a CBOR document and print it as JSON-ish debug output.
	CborDecode {
		file: PathBuf,
	},
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	crt_core::logging::init();
	let cli = Cli::parse();

	let config = match &cli.config {
		Some(path) => {
			let raw = tokio::fs::read_to_string(path).await?;
			Config::from_raw(RawConfig::from_json(&raw)?)?
		},
		None => Config::default(),
	};

	match cli.command {
		Command::Get { bucket, key, out } => get_object(config, bucket, key, out).await,
		Command::Put { bucket, key, file } => put_object(config, bucket, key, file).await,
		Command::CborDecode { file } => cbor_decode(file).await,
	}
}

async fn client(config: Config) -> anyhow::Result<S3Client> {
	let sdk_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
	let provider = sdk_config
		.credentials_provider()
		.ok_or_else(|| anyhow::anyhow!("no AWS credentials provider found in the environment"))?;
	let credentials = Arc::new(DefaultCredentialsProvider::new(provider));
	Ok(S3Client::new(credentials, config.s3_options()))
}

async fn get_object(config: Config, bucket: String, key: String, out: Option<PathBuf>) -> anyhow::Result<()> {
	let client = client(config).await?;
	let opts = GetObjectOptions { response_target: out.clone(), ..Default::default() };
	let response = crt::s3::get_object(&client, &bucket, &key, opts, None).await?;
	if !response.successful() {
		anyhow::bail!("GetObject failed: status {} error {:?}", response.status_code, response.error);
	}
	match (out, response.body) {
		(Some(path), _) => println!("wrote {bucket}/{key} to {}", path.display()),
		(None, Some(body)) => println!("{} bytes: {}", body.len(), String::from_utf8_lossy(&body)),
		(None, None) => println!("ok, no body"),
	}
	Ok(())
}

async fn put_object(config: Config, bucket: String, key: String, file: PathBuf) -> anyhow::Result<()> {
	let client = client(config).await?;
	let response =
		crt::s3::put_object(&client, &bucket, &key, PutBody::File(file), PutObjectOptions::default()).await?;
	if !response.successful() {
		anyhow::bail!("PutObject failed: status {} error {:?}", response.status_code, response.error);
	}
	println!("uploaded {bucket}/{key}");
	Ok(())
}

async fn cbor_decode(file: PathBuf) -> anyhow::Result<()> {
	let bytes = tokio::fs::read(&file).await?;
	let value = crt::cbor::decode(&bytes)?;
	println!("{value:?}");
	Ok(())
}
