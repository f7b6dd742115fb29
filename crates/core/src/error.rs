#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("image could not be sampled for hashing: {message}")]
    Decode { message: String },

    #[error("incompatible fingerprint lengths: {left} bits vs {right} bits")]
    IncompatibleFingerprint { left: usize, right: usize },

    #[error("representative {image_id} is not in the supplied member list")]
    InvalidRepresentative { image_id: i64 },

    #[error("image {image_id} is not a member of cluster {cluster_id}")]
    NotAMember { cluster_id: u64, image_id: i64 },
}

pub type Result<T> = std::result::Result<T, Error>;
