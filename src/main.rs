// src/main.rs
//! Run both sides of the exchange for two private scalars and print the shared
//! j-invariants: `microsidh <skA> <skB>`.

use microsidh::arithmetic::Fp2;
use microsidh::errors::{SidhError, SidhResultExt};
use microsidh::params::SidhParams;
use microsidh::protocols::{isoex_2, isoex_3, isogen_2, isogen_3};

fn parse_scalar(name: &str, arg: Option<String>) -> Result<u32, SidhError> {
    let arg = arg.ok_or_else(|| SidhError::InvalidArgument {
        argument: name.to_string(),
        reason: "missing".to_string(),
    })?;
    arg.trim().parse::<u32>().map_err(|e| SidhError::InvalidArgument {
        argument: name.to_string(),
        reason: format!("{} ({:?})", e, arg),
    })
}

fn run() -> Result<(Fp2, Fp2), SidhError> {
    let mut args = std::env::args().skip(1);
    let sk_a = parse_scalar("skA", args.next())?;
    let sk_b = parse_scalar("skB", args.next())?;

    let params = SidhParams::global()?;

    let pk_b = isogen_3(params, sk_b)?;
    let secret_a = isoex_2(params, &pk_b, sk_a)?;

    let pk_a = isogen_2(params, sk_a)?;
    let secret_b = isoex_3(params, &pk_a, sk_b)?;

    Ok((secret_a, secret_b))
}

fn main() {
    match run().log_on_error(module_path!(), "main", line!()) {
        Ok((secret_a, secret_b)) => {
            println!("{}", secret_a);
            println!("{}", secret_b);
        }
        Err(e) => {
            eprintln!("{}", e.to_user_message());
            eprintln!("usage: microsidh <skA: 0..32767> <skB: 0..4095>");
            std::process::exit(1);
        }
    }
}
