use std::{path::PathBuf, process::ExitCode};

use clap::{Parser, Subcommand};
use jwtsig_core::{
    verify_any, CompactToken, DigestAlgorithm, EncodedSegment, EncodedSignature, PublicKey,
    SignedMessage, VerificationResult, VerifyError,
};

const BANNER: &str = r"
   _          _       _
  (_)_      _| |_ ___(_) __ _
  | \ \ /\ / / __/ __| |/ _` |
  | |\ V  V /| |_\__ \ | (_| |
 _/ | \_/\_/  \__|___/_|\__, |
|__/                    |___/   RS256 / RS384 / RS512 signature check
";

/// Verify the RSA signature of a compact token against a PEM public key
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Args {
    #[command(subcommand)]
    command: Command,

    /// Digest algorithm the token was signed with, repeat to try several in order
    #[arg(short, long = "alg", default_value = "RS256", global = true)]
    algs: Vec<DigestAlgorithm>,

    /// Increase logging verbosity
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Silence all logging
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Do not print the banner
    #[arg(long, global = true)]
    no_banner: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Verify separately supplied header, payload and signature segments
    Parts {
        /// Encoded header segment
        header: String,
        /// Encoded payload segment
        payload: String,
        /// URL-safe base64 signature, padding optional
        #[arg(allow_hyphen_values = true)]
        signature: String,
        /// PEM file holding the RSA public key
        pubkey: PathBuf,
    },
    /// Verify a compact `header.payload.signature` token
    Token {
        /// The full token
        #[arg(allow_hyphen_values = true)]
        token: String,
        /// PEM file holding the RSA public key
        pubkey: PathBuf,
    },
}

fn main() -> ExitCode {
    let args = Args::parse();

    // 0 is errors only, default to warnings
    if let Err(e) = stderrlog::new()
        .verbosity(1 + args.verbose as usize)
        .quiet(args.quiet)
        .init()
    {
        eprintln!("Failed to initialize logger: {}", e);
    }

    if !args.no_banner {
        eprintln!("{}", BANNER);
    }

    match run(&args) {
        Ok(result) => {
            println!("{}", result);
            match result {
                VerificationResult::Valid { .. } => ExitCode::SUCCESS,
                VerificationResult::Invalid => ExitCode::from(1),
            }
        }
        Err(e) => {
            log::error!("{}", e);
            eprintln!("error: {}", e);
            ExitCode::from(2)
        }
    }
}

/// Load the key and check the signature with every requested algorithm
fn run(args: &Args) -> Result<VerificationResult, VerifyError> {
    let (header, payload, signature, pubkey) = match &args.command {
        Command::Parts {
            header,
            payload,
            signature,
            pubkey,
        } => (
            EncodedSegment::new(header),
            EncodedSegment::new(payload),
            EncodedSignature::new(signature),
            pubkey,
        ),
        Command::Token { token, pubkey } => {
            let token = CompactToken::parse(token)?;
            (token.header, token.payload, token.signature, pubkey)
        }
    };

    let key = PublicKey::from_pem_file(pubkey)?;
    let message = SignedMessage::assemble(header, payload);
    let signature = signature.decode()?;

    verify_any(&message, &signature, &key, &args.algs).map_err(Into::into)
}
