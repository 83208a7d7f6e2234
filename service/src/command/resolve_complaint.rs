//! [`Command`] for resolving a [`Complaint`].

use common::{
    operations::{By, Commit, Select, Transact, Transacted, Update},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{complaint, property, user, Complaint, Property},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for resolving a [`Complaint`].
#[derive(Clone, Debug)]
pub struct ResolveComplaint {
    /// ID of the [`Complaint`] to resolve.
    pub complaint_id: complaint::Id,

    /// Text describing the resolution.
    pub resolution: complaint::ResolutionText,

    /// ID of the [`User`] resolving the [`Complaint`].
    ///
    /// [`User`]: crate::domain::User
    pub initiator_id: user::Id,

    /// Role of the initiator, as authenticated.
    pub initiator_role: user::Role,
}

impl<Db> Command<ResolveComplaint> for Service<Db>
where
    Db: Database<
            Select<By<Option<Complaint>, complaint::Id>>,
            Ok = Option<Complaint>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Property>, property::Id>>,
            Ok = Option<Property>,
            Err = Traced<database::Error>,
        > + Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<Update<Complaint>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Complaint;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: ResolveComplaint,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let ResolveComplaint {
            complaint_id,
            resolution,
            initiator_id,
            initiator_role,
        } = cmd;

        if !initiator_role.may(user::Action::ResolveComplaints) {
            return Err(tracerr::new!(E::NotAllowed(initiator_id)));
        }

        let mut complaint = self
            .database()
            .execute(Select(By::<Option<Complaint>, _>::new(complaint_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::ComplaintNotExists(complaint_id))
            .map_err(tracerr::wrap!())?;

        // Owners resolve complaints against their own properties only.
        if initiator_role != user::Role::Admin {
            let property = self
                .database()
                .execute(Select(By::<Option<Property>, _>::new(
                    complaint.property_id,
                )))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .ok_or(E::ComplaintNotExists(complaint_id))
                .map_err(tracerr::wrap!())?;
            if property.owner_id != initiator_id {
                return Err(tracerr::new!(E::NotAllowed(initiator_id)));
            }
        }

        if complaint.status == complaint::Status::Resolved {
            return Err(tracerr::new!(E::AlreadyResolved(complaint_id)));
        }

        complaint.status = complaint::Status::Resolved;
        complaint.resolution = Some(complaint::Resolution {
            text: resolution,
            resolved_by: initiator_id,
            resolved_at: DateTime::now().coerce(),
        });

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Update(complaint.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(complaint)
    }
}

/// Error of [`ResolveComplaint`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Complaint`] is already resolved.
    #[display("`Complaint(id: {_0})` is already resolved")]
    AlreadyResolved(#[error(not(source))] complaint::Id),

    /// [`Complaint`] with the provided ID does not exist.
    #[display("`Complaint(id: {_0})` does not exist")]
    ComplaintNotExists(#[error(not(source))] complaint::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// Initiator may not resolve this [`Complaint`].
    #[display("`User(id: {_0})` may not resolve this `Complaint`")]
    NotAllowed(#[error(not(source))] user::Id),
}
