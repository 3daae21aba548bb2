use alloy_primitives::{B256, U256};

use crate::error::MintError;

// 铸造请求的生命周期
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum MintStatus {
    // 可以铸造
    #[default]
    Idle,
    // 等待钱包签名
    AwaitingApproval,
    // 交易已广播，等待收据
    Submitted { tx_hash: B256 },
    // 收据成功，终止状态；token_id 可能无法得知
    Confirmed {
        tx_hash: B256,
        token_id: Option<U256>,
    },
    // 拒签、回滚或交易丢失，可以重新铸造
    Failed { reason: String },
}

impl MintStatus {
    // 按钮是否禁用
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::AwaitingApproval | Self::Submitted { .. })
    }

    pub fn is_confirmed(&self) -> bool {
        matches!(self, Self::Confirmed { .. })
    }

    pub fn token_id(&self) -> Option<U256> {
        match self {
            Self::Confirmed { token_id, .. } => *token_id,
            _ => None,
        }
    }

    pub fn tx_hash(&self) -> Option<B256> {
        match self {
            Self::Submitted { tx_hash } | Self::Confirmed { tx_hash, .. } => Some(*tx_hash),
            _ => None,
        }
    }

    // idle / failed -> awaiting-approval
    pub fn begin(&mut self) -> Result<(), MintError> {
        match self {
            Self::Idle | Self::Failed { .. } => {
                *self = Self::AwaitingApproval;
                Ok(())
            }
            Self::AwaitingApproval | Self::Submitted { .. } => Err(MintError::AlreadyPending),
            Self::Confirmed { .. } => Err(MintError::AlreadyMinted),
        }
    }

    // awaiting-approval -> submitted
    pub fn submitted(&mut self, tx_hash: B256) -> Result<(), MintError> {
        match self {
            Self::AwaitingApproval => {
                *self = Self::Submitted { tx_hash };
                Ok(())
            }
            _ => Err(self.unexpected()),
        }
    }

    // submitted -> confirmed，只接受同一笔交易
    pub fn confirmed(&mut self, tx_hash: B256, token_id: Option<U256>) -> Result<(), MintError> {
        match self {
            Self::Submitted { tx_hash: pending } if *pending == tx_hash => {
                *self = Self::Confirmed { tx_hash, token_id };
                Ok(())
            }
            _ => Err(self.unexpected()),
        }
    }

    // awaiting-approval -> failed，签名或广播失败
    pub fn rejected(&mut self, reason: impl Into<String>) -> Result<(), MintError> {
        match self {
            Self::AwaitingApproval => {
                *self = Self::Failed {
                    reason: reason.into(),
                };
                Ok(())
            }
            _ => Err(self.unexpected()),
        }
    }

    // submitted -> failed，只接受同一笔交易
    pub fn reverted(&mut self, tx_hash: B256, reason: impl Into<String>) -> Result<(), MintError> {
        match self {
            Self::Submitted { tx_hash: pending } if *pending == tx_hash => {
                *self = Self::Failed {
                    reason: reason.into(),
                };
                Ok(())
            }
            Self::Submitted { .. } | Self::AwaitingApproval => {
                Err(MintError::UnknownTransaction { tx_hash })
            }
            _ => Err(self.unexpected()),
        }
    }

    // 是否正在等待这笔交易的收据
    pub fn is_waiting_for(&self, tx_hash: B256) -> bool {
        matches!(self, Self::Submitted { tx_hash: pending } if *pending == tx_hash)
    }

    fn unexpected(&self) -> MintError {
        match self {
            Self::Confirmed { .. } => MintError::AlreadyMinted,
            Self::AwaitingApproval | Self::Submitted { .. } => MintError::AlreadyPending,
            Self::Idle | Self::Failed { .. } => MintError::NotPrepared,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_states() -> Vec<MintStatus> {
        vec![
            MintStatus::Idle,
            MintStatus::AwaitingApproval,
            MintStatus::Submitted {
                tx_hash: B256::repeat_byte(1),
            },
            MintStatus::Confirmed {
                tx_hash: B256::repeat_byte(1),
                token_id: Some(U256::from(6)),
            },
            MintStatus::Failed {
                reason: "user rejected".into(),
            },
        ]
    }

    #[test]
    fn happy_path() {
        let hash = B256::repeat_byte(7);
        let mut status = MintStatus::default();
        status.begin().unwrap();
        assert_eq!(status, MintStatus::AwaitingApproval);
        status.submitted(hash).unwrap();
        assert_eq!(status.tx_hash(), Some(hash));
        status.confirmed(hash, Some(U256::from(6))).unwrap();
        assert!(status.is_confirmed());
        assert_eq!(status.token_id(), Some(U256::from(6)));
    }

    #[test]
    fn pending_only_while_waiting() {
        for status in all_states() {
            let expected = matches!(
                status,
                MintStatus::AwaitingApproval | MintStatus::Submitted { .. }
            );
            assert_eq!(status.is_pending(), expected, "{status:?}");
        }
    }

    #[test]
    fn begin_is_refused_while_pending_or_confirmed() {
        for mut status in all_states() {
            let before = status.clone();
            let result = status.begin();
            match before {
                MintStatus::Idle | MintStatus::Failed { .. } => assert!(result.is_ok()),
                MintStatus::Confirmed { .. } => {
                    assert!(matches!(result, Err(MintError::AlreadyMinted)));
                    assert_eq!(status, before);
                }
                _ => {
                    assert!(matches!(result, Err(MintError::AlreadyPending)));
                    assert_eq!(status, before);
                }
            }
        }
    }

    #[test]
    fn failure_returns_to_mintable() {
        let mut status = MintStatus::AwaitingApproval;
        status.rejected("user rejected").unwrap();
        assert!(!status.is_pending());
        status.begin().unwrap();
        assert_eq!(status, MintStatus::AwaitingApproval);
    }

    #[test]
    fn confirmation_for_other_hash_is_refused() {
        let mut status = MintStatus::Submitted {
            tx_hash: B256::repeat_byte(1),
        };
        assert!(status.confirmed(B256::repeat_byte(2), Some(U256::ZERO)).is_err());
        assert_eq!(status.tx_hash(), Some(B256::repeat_byte(1)));
    }

    #[test]
    fn cannot_fail_from_idle() {
        let mut status = MintStatus::Idle;
        assert!(status.rejected("nothing to fail").is_err());
        assert!(status.reverted(B256::ZERO, "nothing to fail").is_err());
        assert_eq!(status, MintStatus::Idle);
    }

    #[test]
    fn revert_only_fails_the_submitted_transaction() {
        let mut status = MintStatus::Submitted {
            tx_hash: B256::repeat_byte(1),
        };
        assert!(matches!(
            status.reverted(B256::repeat_byte(2), "reverted"),
            Err(MintError::UnknownTransaction { .. })
        ));
        assert!(status.is_waiting_for(B256::repeat_byte(1)));

        status.reverted(B256::repeat_byte(1), "reverted").unwrap();
        assert!(matches!(status, MintStatus::Failed { .. }));
    }

    #[test]
    fn revert_cannot_interrupt_approval() {
        let mut status = MintStatus::AwaitingApproval;
        assert!(status.reverted(B256::repeat_byte(9), "reverted").is_err());
        assert_eq!(status, MintStatus::AwaitingApproval);
        assert!(!status.is_waiting_for(B256::repeat_byte(9)));
    }

    #[test]
    fn rejection_only_while_awaiting_approval() {
        let mut status = MintStatus::Submitted {
            tx_hash: B256::repeat_byte(1),
        };
        assert!(status.rejected("user rejected").is_err());
        assert!(status.is_pending());
    }
}
