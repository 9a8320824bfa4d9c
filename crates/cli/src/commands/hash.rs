use std::path::Path;

use anyhow::Context;
use basehealth_core::fingerprint::{digest_file, DigestAlgorithm};
use basehealth_core::Fingerprint;

pub fn run(path: &Path, algorithm: &str) -> anyhow::Result<Fingerprint> {
    let alg = DigestAlgorithm::from_name(algorithm)
        .ok_or_else(|| anyhow::anyhow!("Unknown digest algorithm {:?}", algorithm))?;
    let fp = digest_file(alg, path).with_context(|| format!("Failed to hash {}", path.display()))?;
    println!("{}  {}", fp, path.display());
    Ok(fp)
}
