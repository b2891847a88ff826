//! Longest-valid-chain rule.

use powchain_ledger::{verify_chain, Block, Ledger};

use crate::error::ConsensusError;

/// Outcome of offering a candidate chain to the ledger.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChainDecision {
    Adopted { old_len: usize, new_len: usize },
    Rejected(ConsensusError),
}

impl ChainDecision {
    pub fn is_adopted(&self) -> bool {
        matches!(self, ChainDecision::Adopted { .. })
    }
}

/// Decide whether `candidate` should replace the local chain.
///
/// Length is checked before validity so a short chain is never hashed.
pub fn evaluate_chain(local: &Ledger, candidate: &[Block]) -> Result<(), ConsensusError> {
    if candidate.len() <= local.len() {
        return Err(ConsensusError::NotLonger {
            candidate: candidate.len(),
            local: local.len(),
        });
    }
    verify_chain(candidate, local.difficulty())?;
    Ok(())
}

/// Replace the ledger's chain with `candidate` if [`evaluate_chain`] allows it.
pub fn apply_chain(ledger: &mut Ledger, candidate: Vec<Block>) -> ChainDecision {
    match evaluate_chain(ledger, &candidate) {
        Ok(()) => {
            let old_len = ledger.len();
            let new_len = candidate.len();
            ledger.replace_chain(candidate);
            ChainDecision::Adopted { old_len, new_len }
        }
        Err(reason) => {
            tracing::info!(
                local = ledger.len(),
                candidate = candidate.len(),
                %reason,
                "received chain rejected"
            );
            ChainDecision::Rejected(reason)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use powchain_ledger::ValidationError;
    use powchain_types::ChainParams;

    fn ledger_of_len(len: usize) -> Ledger {
        let mut ledger = Ledger::new(ChainParams::with_difficulty(1).unwrap()).unwrap();
        while ledger.len() < len {
            ledger.add_block(Vec::new()).unwrap();
        }
        ledger
    }

    #[test]
    fn longer_valid_chain_adopted() {
        let mut local = ledger_of_len(3);
        let remote = ledger_of_len(5);
        let decision = apply_chain(&mut local, remote.blocks().to_vec());
        assert_eq!(decision, ChainDecision::Adopted { old_len: 3, new_len: 5 });
        assert_eq!(local.blocks(), remote.blocks());
    }

    #[test]
    fn equal_length_rejected() {
        let mut local = ledger_of_len(3);
        let remote = ledger_of_len(3);
        let before = local.blocks().to_vec();
        let decision = apply_chain(&mut local, remote.blocks().to_vec());
        assert_eq!(
            decision,
            ChainDecision::Rejected(ConsensusError::NotLonger { candidate: 3, local: 3 })
        );
        assert_eq!(local.blocks(), before.as_slice());
    }

    #[test]
    fn shorter_chain_rejected() {
        let mut local = ledger_of_len(5);
        let decision = apply_chain(&mut local, ledger_of_len(3).blocks().to_vec());
        assert!(!decision.is_adopted());
        assert_eq!(local.len(), 5);
    }

    #[test]
    fn longer_invalid_chain_rejected() {
        let mut local = ledger_of_len(2);
        let mut blocks = ledger_of_len(4).blocks().to_vec();
        blocks[2].nonce += 1;
        let decision = apply_chain(&mut local, blocks);
        assert_eq!(
            decision,
            ChainDecision::Rejected(ConsensusError::InvalidChain(ValidationError::HashMismatch {
                position: 2
            }))
        );
        assert_eq!(local.len(), 2);
    }

    #[test]
    fn three_then_five_then_three() {
        let mut local = Ledger::new(ChainParams::with_difficulty(1).unwrap()).unwrap();
        let three = ledger_of_len(3).blocks().to_vec();
        let five = ledger_of_len(5).blocks().to_vec();

        assert!(apply_chain(&mut local, three.clone()).is_adopted());
        assert!(apply_chain(&mut local, five.clone()).is_adopted());
        assert!(!apply_chain(&mut local, three).is_adopted());
        assert_eq!(local.blocks(), five.as_slice());
    }
}
