use smallvec::SmallVec;

/// Index buckets assigned to an oracle at registration.
///
/// The contract hands out three distinct indexes per oracle.
pub type OracleIndexes = SmallVec<[u8; 3]>;
