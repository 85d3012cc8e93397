//! `dirseal keygen` — print a fresh random key.
//!
//! Raw keys are 32 alphanumeric characters so they can be pasted straight
//! into an environment variable; base64 keys carry 32 fully random bytes.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use rand::distr::{Alphanumeric, SampleString};
use rand::RngCore;
use zeroize::Zeroizing;

use crate::cli::output;
use crate::crypto::{KeyEncoding, KEY_LEN};
use crate::errors::Result;

/// Execute the `keygen` command.
pub fn execute(encoding: KeyEncoding) -> Result<()> {
    let key = generate(encoding);
    println!("{}", key.as_str());
    output::warning("Store this key safely: files encrypted with it cannot be recovered without it.");
    Ok(())
}

/// Produce a key string in the requested encoding.
pub fn generate(encoding: KeyEncoding) -> Zeroizing<String> {
    let mut rng = rand::rng();
    match encoding {
        KeyEncoding::Raw => Zeroizing::new(Alphanumeric.sample_string(&mut rng, KEY_LEN)),
        KeyEncoding::Base64 => {
            let mut bytes = Zeroizing::new([0u8; KEY_LEN]);
            rng.fill_bytes(&mut *bytes);
            Zeroizing::new(BASE64.encode(&*bytes))
        }
    }
}
