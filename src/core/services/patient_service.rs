//! Clinic roster operations: profiles, procedures, appointments and archiving.

use chrono::NaiveDate;
use tracing::{info, warn};
use uuid::Uuid;

use crate::core::services::entry_service::{EntryService, NewEntry};
use crate::core::services::settlement_service::{SettlementReport, SettlementService};
use crate::domain::entry::EntryKind;
use crate::domain::patient::{ContactNumber, Patient, Roster};
use crate::errors::{LedgerError, Result};

/// Validated input for a new patient profile.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPatient {
    pub first_name: String,
    pub last_name: String,
    pub birthday: Option<NaiveDate>,
    pub contact: ContactNumber,
}

impl NewPatient {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        contact: ContactNumber,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            birthday: None,
            contact,
        }
    }

    pub fn with_birthday(mut self, birthday: NaiveDate) -> Self {
        self.birthday = Some(birthday);
        self
    }
}

/// Result of marking an appointment as attended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisitOutcome {
    pub schedule: NaiveDate,
    /// `false` when the visit was recorded on a day other than the scheduled one.
    pub on_schedule: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnpaidBalance {
    pub patient_id: Uuid,
    pub name: String,
    pub balance: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Appointment {
    pub patient_id: Uuid,
    pub name: String,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClinicDashboard {
    pub today: NaiveDate,
    /// Patients due today who have not been seen yet.
    pub pending_today: Vec<String>,
    pub unpaid_patients: usize,
}

/// Patients moved by an archive pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArchiveReport {
    pub archived: Vec<Uuid>,
}

impl ArchiveReport {
    pub fn is_empty(&self) -> bool {
        self.archived.is_empty()
    }
}

pub struct PatientService;

impl PatientService {
    pub fn create(roster: &mut Roster, input: NewPatient, today: NaiveDate) -> Result<Uuid> {
        let first_name = required_name("first name", &input.first_name)?;
        let last_name = required_name("last name", &input.last_name)?;
        let mut patient = Patient::new(first_name, last_name, input.contact, today);
        patient.birthday = input.birthday;
        let id = patient.id;
        info!(patient = %id, name = %patient.full_name(), "patient created");
        roster.active.push(patient);
        Ok(id)
    }

    /// Active patients whose first, last or full name contains `query`, ignoring case.
    pub fn find_by_name<'a>(roster: &'a Roster, query: &str) -> Vec<&'a Patient> {
        if query.trim().is_empty() {
            return Vec::new();
        }
        roster
            .active
            .iter()
            .filter(|patient| patient.matches_name(query))
            .collect()
    }

    /// Resolves `query` to one active patient. A patient id is taken as is;
    /// otherwise an exact full-name match (ignoring case) wins over partial
    /// matches. Ambiguous queries fail with every candidate and its id.
    pub fn select(roster: &Roster, query: &str) -> Result<Uuid> {
        let query = query.trim();
        if let Ok(id) = Uuid::parse_str(query) {
            return roster
                .active
                .iter()
                .find(|patient| patient.id == id)
                .map(|patient| patient.id)
                .ok_or_else(|| LedgerError::OwnerNotFound(query.to_string()));
        }

        let wanted = query.to_lowercase();
        let exact: Vec<&Patient> = roster
            .active
            .iter()
            .filter(|patient| patient.full_name().to_lowercase() == wanted)
            .collect();
        let candidates = if exact.is_empty() {
            Self::find_by_name(roster, query)
        } else {
            exact
        };
        match candidates.as_slice() {
            [patient] => Ok(patient.id),
            [] => Err(LedgerError::OwnerNotFound(query.to_string())),
            many => {
                let listed: Vec<String> = many
                    .iter()
                    .map(|patient| format!("{} ({})", patient.full_name(), patient.id))
                    .collect();
                Err(LedgerError::InvalidInput(format!(
                    "`{query}` matches several patients: {}",
                    listed.join(", ")
                )))
            }
        }
    }

    pub fn patient_mut(roster: &mut Roster, id: Uuid) -> Result<&mut Patient> {
        roster
            .active_mut(id)
            .ok_or_else(|| LedgerError::OwnerNotFound(id.to_string()))
    }

    pub fn update_names(
        roster: &mut Roster,
        id: Uuid,
        first_name: Option<&str>,
        last_name: Option<&str>,
        today: NaiveDate,
    ) -> Result<()> {
        let first = first_name
            .map(|name| required_name("first name", name))
            .transpose()?;
        let last = last_name
            .map(|name| required_name("last name", name))
            .transpose()?;
        let patient = Self::patient_mut(roster, id)?;
        if let Some(first) = first {
            patient.first_name = first;
        }
        if let Some(last) = last {
            patient.last_name = last;
        }
        patient.touch(today);
        info!(patient = %id, "patient renamed");
        Ok(())
    }

    pub fn update_contact(
        roster: &mut Roster,
        id: Uuid,
        contact: ContactNumber,
        today: NaiveDate,
    ) -> Result<()> {
        let patient = Self::patient_mut(roster, id)?;
        patient.contact = contact;
        patient.touch(today);
        info!(patient = %id, "contact updated");
        Ok(())
    }

    /// Bills a procedure dated `today` and returns the charge id.
    pub fn record_procedure(
        roster: &mut Roster,
        id: Uuid,
        name: &str,
        amount: f64,
        today: NaiveDate,
    ) -> Result<u64> {
        let procedure = name.trim();
        if procedure.is_empty() {
            return Err(LedgerError::InvalidInput(
                "procedure name cannot be empty".into(),
            ));
        }
        let patient = Self::patient_mut(roster, id)?;
        let charge_id = EntryService::add(
            &mut patient.ledger,
            NewEntry::new(today, EntryKind::Charge, amount, procedure),
        )?;
        patient.touch(today);
        info!(patient = %id, charge = charge_id, amount, "procedure recorded");
        Ok(charge_id)
    }

    pub fn settle(
        roster: &mut Roster,
        id: Uuid,
        payment: f64,
        today: NaiveDate,
    ) -> Result<SettlementReport> {
        let patient = Self::patient_mut(roster, id)?;
        let report = SettlementService::settle(&mut patient.ledger, payment)?;
        patient.touch(today);
        Ok(report)
    }

    /// Books the next appointment. A new booking is always pending.
    pub fn reschedule(
        roster: &mut Roster,
        id: Uuid,
        date: NaiveDate,
        today: NaiveDate,
    ) -> Result<()> {
        let patient = Self::patient_mut(roster, id)?;
        patient.schedule = Some(date);
        patient.visit_done = false;
        patient.touch(today);
        info!(patient = %id, %date, "appointment scheduled");
        Ok(())
    }

    pub fn mark_visit_done(
        roster: &mut Roster,
        id: Uuid,
        today: NaiveDate,
    ) -> Result<VisitOutcome> {
        let patient = Self::patient_mut(roster, id)?;
        let schedule = patient.schedule.ok_or_else(|| {
            LedgerError::InvalidInput(format!("{} has no scheduled visit", patient.full_name()))
        })?;
        let on_schedule = schedule == today;
        if !on_schedule {
            warn!(patient = %id, %schedule, %today, "visit marked outside its scheduled day");
        }
        patient.visit_done = true;
        patient.touch(today);
        Ok(VisitOutcome {
            schedule,
            on_schedule,
        })
    }

    pub fn unpaid_balances(roster: &Roster) -> Vec<UnpaidBalance> {
        roster
            .active
            .iter()
            .filter(|patient| patient.is_active)
            .filter_map(|patient| {
                let balance = patient.ledger.balance();
                (balance > 0.0).then(|| UnpaidBalance {
                    patient_id: patient.id,
                    name: patient.full_name(),
                    balance,
                })
            })
            .collect()
    }

    /// Appointments from `today` on, earliest first. Visits already done
    /// today are left out.
    pub fn upcoming_appointments(roster: &Roster, today: NaiveDate) -> Vec<Appointment> {
        let mut upcoming: Vec<Appointment> = roster
            .active
            .iter()
            .filter(|patient| patient.is_active)
            .filter_map(|patient| {
                let date = patient.schedule?;
                if date < today || (date == today && patient.visit_done) {
                    return None;
                }
                Some(Appointment {
                    patient_id: patient.id,
                    name: patient.full_name(),
                    date,
                })
            })
            .collect();
        upcoming.sort_by_key(|appointment| appointment.date);
        upcoming
    }

    pub fn dashboard(roster: &Roster, today: NaiveDate) -> ClinicDashboard {
        let pending_today = roster
            .active
            .iter()
            .filter(|patient| {
                patient.is_active && patient.schedule == Some(today) && !patient.visit_done
            })
            .map(Patient::full_name)
            .collect();
        ClinicDashboard {
            today,
            pending_today,
            unpaid_patients: Self::unpaid_balances(roster).len(),
        }
    }

    pub fn archive(roster: &mut Roster, id: Uuid, today: NaiveDate) -> Result<()> {
        let index = roster
            .active
            .iter()
            .position(|patient| patient.id == id)
            .ok_or_else(|| LedgerError::OwnerNotFound(id.to_string()))?;
        let mut patient = roster.active.remove(index);
        patient.is_active = false;
        patient.touch(today);
        info!(patient = %id, "patient archived");
        roster.archived.push(patient);
        Ok(())
    }

    /// Moves patients untouched for more than `archive_after_days` days, and
    /// any inactive ones, to the archive. A missing `last_updated` counts as
    /// today.
    pub fn auto_archive(
        roster: &mut Roster,
        today: NaiveDate,
        archive_after_days: i64,
    ) -> ArchiveReport {
        let mut report = ArchiveReport::default();
        let (stale, keep): (Vec<Patient>, Vec<Patient>) = std::mem::take(&mut roster.active)
            .into_iter()
            .partition(|patient| {
                let last = patient.last_updated.unwrap_or(today);
                (today - last).num_days() > archive_after_days || !patient.is_active
            });
        roster.active = keep;
        for mut patient in stale {
            patient.is_active = false;
            report.archived.push(patient.id);
            roster.archived.push(patient);
        }
        if !report.is_empty() {
            info!(count = report.archived.len(), "inactive patients archived");
        }
        report
    }
}

fn required_name(field: &str, raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        Err(LedgerError::InvalidInput(format!("{field} cannot be empty")))
    } else {
        Ok(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ledger::OwnerStatus;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    fn contact() -> ContactNumber {
        ContactNumber::parse("09171234567").unwrap()
    }

    fn roster_with(names: &[(&str, &str)]) -> (Roster, Vec<Uuid>) {
        let mut roster = Roster::default();
        let ids = names
            .iter()
            .map(|(first, last)| {
                let input = NewPatient::new(*first, *last, contact());
                PatientService::create(&mut roster, input, day(1)).unwrap()
            })
            .collect();
        (roster, ids)
    }

    #[test]
    fn create_rejects_blank_names() {
        let mut roster = Roster::default();
        let input = NewPatient::new(" ", "Cruz", contact());
        let err = PatientService::create(&mut roster, input, day(1)).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidInput(_)));
        assert!(roster.is_empty());
    }

    #[test]
    fn procedures_and_payments_drive_the_balance() {
        let (mut roster, ids) = roster_with(&[("Ana", "Reyes")]);
        let id = ids[0];
        PatientService::record_procedure(&mut roster, id, "Cleaning", 100.0, day(2)).unwrap();
        PatientService::record_procedure(&mut roster, id, "Filling", 50.0, day(3)).unwrap();
        let report = PatientService::settle(&mut roster, id, 120.0, day(4)).unwrap();
        assert_eq!(report.balance, 30.0);
        assert_eq!(report.status, OwnerStatus::Unpaid);

        let patient = roster.get(id).unwrap();
        assert_eq!(patient.last_updated, Some(day(4)));
        assert_eq!(patient.ledger.entries[1].paid, 20.0);
        assert!(PatientService::record_procedure(&mut roster, id, "  ", 10.0, day(4)).is_err());
    }

    #[test]
    fn visit_requires_a_schedule() {
        let (mut roster, ids) = roster_with(&[("Ben", "Lim")]);
        assert!(matches!(
            PatientService::mark_visit_done(&mut roster, ids[0], day(5)),
            Err(LedgerError::InvalidInput(_))
        ));
        PatientService::reschedule(&mut roster, ids[0], day(6), day(5)).unwrap();
        let outcome = PatientService::mark_visit_done(&mut roster, ids[0], day(5)).unwrap();
        assert!(!outcome.on_schedule);
        assert!(roster.get(ids[0]).unwrap().visit_done);
    }

    #[test]
    fn upcoming_skips_past_and_completed_visits() {
        let (mut roster, ids) =
            roster_with(&[("A", "One"), ("B", "Two"), ("C", "Three"), ("D", "Four")]);
        PatientService::reschedule(&mut roster, ids[0], day(20), day(10)).unwrap();
        PatientService::reschedule(&mut roster, ids[1], day(10), day(10)).unwrap();
        PatientService::reschedule(&mut roster, ids[2], day(9), day(10)).unwrap();
        PatientService::reschedule(&mut roster, ids[3], day(10), day(10)).unwrap();
        PatientService::mark_visit_done(&mut roster, ids[3], day(10)).unwrap();

        let upcoming = PatientService::upcoming_appointments(&roster, day(10));
        let names: Vec<_> = upcoming.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["B Two", "A One"]);

        let dashboard = PatientService::dashboard(&roster, day(10));
        assert_eq!(dashboard.pending_today, vec!["B Two".to_string()]);
        assert_eq!(dashboard.unpaid_patients, 0);
    }

    #[test]
    fn auto_archive_moves_stale_and_inactive_patients() {
        let (mut roster, ids) =
            roster_with(&[("Old", "Timer"), ("Fresh", "Face"), ("Gone", "Away")]);
        roster.active_mut(ids[0]).unwrap().last_updated = NaiveDate::from_ymd_opt(2024, 1, 1);
        roster.active_mut(ids[1]).unwrap().last_updated = None;
        roster.active_mut(ids[2]).unwrap().is_active = false;

        let report = PatientService::auto_archive(&mut roster, day(1), 90);
        assert_eq!(report.archived, vec![ids[0], ids[2]]);
        assert_eq!(roster.active.len(), 1);
        assert!(roster.archived.iter().all(|p| !p.is_active));
    }

    #[test]
    fn archived_patients_are_out_of_reach() {
        let (mut roster, ids) = roster_with(&[("Ana", "Reyes")]);
        PatientService::archive(&mut roster, ids[0], day(2)).unwrap();
        assert!(PatientService::find_by_name(&roster, "ana").is_empty());
        assert!(matches!(
            PatientService::settle(&mut roster, ids[0], 0.0, day(2)),
            Err(LedgerError::OwnerNotFound(_))
        ));
    }

    #[test]
    fn select_prefers_exact_names_then_ids() {
        let (roster, ids) = roster_with(&[("Li", "Tan"), ("Lia", "Tan"), ("Lia", "Tan")]);
        assert_eq!(PatientService::select(&roster, "li tan").unwrap(), ids[0]);
        assert_eq!(
            PatientService::select(&roster, &ids[2].to_string()).unwrap(),
            ids[2]
        );

        let err = PatientService::select(&roster, "Lia Tan").unwrap_err();
        let message = err.to_string();
        assert!(matches!(err, LedgerError::InvalidInput(_)));
        assert!(message.contains(&ids[1].to_string()), "{message}");
        assert!(message.contains(&ids[2].to_string()), "{message}");

        assert!(matches!(
            PatientService::select(&roster, "Nobody"),
            Err(LedgerError::OwnerNotFound(_))
        ));
        assert!(matches!(
            PatientService::select(&roster, &Uuid::new_v4().to_string()),
            Err(LedgerError::OwnerNotFound(_))
        ));
    }
}
