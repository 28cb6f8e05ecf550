use crate::cryptography::Credential;
use crate::executor::{Backend, VerifyError};
use crate::ids::Id;
use crate::state::{Chain, StateError};
use crate::txs::{SubnetAuth, Tx};

/// Checks that the last credential of `tx` satisfies the current owner of
/// `subnet_id` and returns the remaining credentials, which pay for the
/// transaction's inputs.
pub fn verify_subnet_authorization<'t>(
    backend: &Backend,
    state: &dyn Chain,
    tx: &'t Tx,
    subnet_id: Id,
    auth: &SubnetAuth,
) -> Result<&'t [Credential], VerifyError> {
    let (subnet_cred, base_creds) = tx
        .creds()
        .split_last()
        .ok_or(VerifyError::WrongNumberOfCredentials)?;

    let owner = state.get_subnet_owner(subnet_id)?;
    backend
        .fx
        .verify_permission(tx, auth, subnet_cred, &owner, state.timestamp())
        .map_err(VerifyError::UnauthorizedSubnetModification)?;

    Ok(base_creds)
}

/// Like [`verify_subnet_authorization`], but only for subnets that have not
/// been transformed to elastic staking. Transformed subnets no longer accept
/// owner-administered changes.
pub fn verify_poa_subnet_authorization<'t>(
    backend: &Backend,
    state: &dyn Chain,
    tx: &'t Tx,
    subnet_id: Id,
    auth: &SubnetAuth,
) -> Result<&'t [Credential], VerifyError> {
    match state.get_subnet_transformation(subnet_id) {
        Ok(_) => return Err(VerifyError::IsImmutable(subnet_id)),
        Err(StateError::NotFound) => {}
        Err(err) => return Err(err.into()),
    }
    verify_subnet_authorization(backend, state, tx, subnet_id, auth)
}
