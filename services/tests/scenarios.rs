// services/tests/scenarios.rs
//! End-to-end scenarios over the in-memory store: scheduling conflicts,
//! stock issuance, site scoping and lifecycle rules.

use chrono::{Duration, Utc};
use std::sync::Arc;

use hospital_models::{
    AppointmentStatus, DocumentType, EquipmentStatus, HospitalError, ServiceType,
};
use hospital_services::{
    load_demo_data, AppointmentService, AuditService, AuthContext, ClinicalRecordService,
    EquipmentService, HmacSha256Hasher, IdentityService, NewAppointment, NewEquipment,
    NewPatient, NewPrescription, PasswordHasher, PatientService, PharmacyService, SeedData,
};
use hospital_storage::{HospitalStore, InMemoryStore};

struct Hospital {
    store: Arc<dyn HospitalStore>,
    seed: SeedData,
    identity: IdentityService,
    patients: PatientService,
    appointments: AppointmentService,
    clinical: ClinicalRecordService,
    pharmacy: PharmacyService,
    equipment: EquipmentService,
}

async fn hospital() -> Hospital {
    let store: Arc<dyn HospitalStore> = Arc::new(InMemoryStore::new());
    let hasher: Arc<dyn PasswordHasher> = Arc::new(HmacSha256Hasher::new(b"test-secret"));
    let seed = load_demo_data(&store, &hasher).await.unwrap();
    let config = hospital_models::CoreConfig::default();
    let audit = AuditService::new(Arc::clone(&store));
    let clinical = ClinicalRecordService::new(Arc::clone(&store), audit.clone());
    Hospital {
        identity: IdentityService::new(Arc::clone(&store), hasher, audit.clone()),
        patients: PatientService::new(Arc::clone(&store), audit.clone()),
        appointments: AppointmentService::new(
            Arc::clone(&store),
            audit.clone(),
            clinical.clone(),
            config.clone(),
        ),
        pharmacy: PharmacyService::new(Arc::clone(&store), audit.clone(), config),
        equipment: EquipmentService::new(Arc::clone(&store), audit),
        clinical,
        store,
        seed,
    }
}

impl Hospital {
    async fn login(&self, email: &str) -> AuthContext {
        self.identity
            .authenticate(email, "changeme1", None)
            .await
            .unwrap()
            .context()
    }

    fn booking(&self, clinician: uuid::Uuid, department: uuid::Uuid, days: i64) -> NewAppointment {
        NewAppointment {
            patient_id: self.seed.patient,
            clinician_id: clinician,
            site_id: None,
            department_id: department,
            scheduled_at: Utc::now() + Duration::days(days),
            service_type: ServiceType::Consultation,
            reason: Some("control general".to_string()),
        }
    }
}

#[tokio::test]
async fn double_booking_same_clinician_same_instant_is_rejected() {
    let h = hospital().await;
    let clerk = h.login("admin@hospital.test").await;
    let mut first = h.booking(h.seed.doctor_north, h.seed.dept_general_north.id, 2);
    first.site_id = Some(h.seed.site_north.id);
    let scheduled = h.appointments.schedule(&clerk, first.clone()).await.unwrap();

    // Same clinician, exact same instant.
    let mut second = first.clone();
    second.scheduled_at = scheduled.scheduled_at;
    let err = h.appointments.schedule(&clerk, second).await.unwrap_err();
    assert!(matches!(err, HospitalError::Conflict(_)));

    let listed = h.appointments.list(&clerk, None).await.unwrap();
    assert_eq!(listed.len(), 1, "the failed attempt must not leave a row");
}

#[tokio::test]
async fn cancelling_a_cancelled_appointment_is_a_no_op() {
    let h = hospital().await;
    let admin = h.login("admin@hospital.test").await;
    let mut req = h.booking(h.seed.doctor_north, h.seed.dept_general_north.id, 3);
    req.site_id = Some(h.seed.site_north.id);
    let appointment = h.appointments.schedule(&admin, req).await.unwrap();

    let status = h.appointments.cancel(&admin, appointment.id).await.unwrap();
    assert_eq!(status, AppointmentStatus::Cancelled);
    // Second cancel stays Cancelled without error.
    let status = h.appointments.cancel(&admin, appointment.id).await.unwrap();
    assert_eq!(status, AppointmentStatus::Cancelled);
}

#[tokio::test]
async fn completed_appointments_cannot_be_cancelled() {
    let h = hospital().await;
    let doctor = h.login("mrincon@hospital.test").await;
    let req = h.booking(h.seed.doctor_north, h.seed.dept_general_north.id, 1);
    let appointment = h.appointments.schedule(&doctor, req).await.unwrap();
    h.clinical
        .register(&doctor, appointment.id, h.seed.influenza.id, None)
        .await
        .unwrap();

    let admin = h.login("admin@hospital.test").await;
    let err = h.appointments.cancel(&admin, appointment.id).await.unwrap_err();
    assert!(matches!(err, HospitalError::Conflict(_)));
}

#[tokio::test]
async fn schedule_complete_and_read_back_the_history() {
    let h = hospital().await;
    let doctor = h.login("mrincon@hospital.test").await;
    let req = h.booking(h.seed.doctor_north, h.seed.dept_general_north.id, 1);
    let appointment = h.appointments.schedule(&doctor, req).await.unwrap();

    let history = h
        .clinical
        .register(&doctor, appointment.id, h.seed.influenza.id, Some("fiebre alta".into()))
        .await
        .unwrap();
    assert_eq!(history.appointment_id, appointment.id);
    assert_eq!(history.diagnosis_text, "Influenza");

    let completed = h.appointments.detail(&doctor, appointment.id).await.unwrap();
    assert_eq!(completed.status, AppointmentStatus::Completed);

    let detail = h.clinical.detail(&doctor, history.id).await.unwrap();
    assert_eq!(detail.visits.len(), 1);
    assert_eq!(detail.visits[0].disease_name.as_deref(), Some("Influenza"));
}

#[tokio::test]
async fn a_second_diagnosis_for_the_same_visit_conflicts() {
    let h = hospital().await;
    let doctor = h.login("mrincon@hospital.test").await;
    let req = h.booking(h.seed.doctor_north, h.seed.dept_general_north.id, 1);
    let appointment = h.appointments.schedule(&doctor, req).await.unwrap();
    h.clinical
        .register(&doctor, appointment.id, h.seed.influenza.id, None)
        .await
        .unwrap();
    let err = h
        .clinical
        .register(&doctor, appointment.id, h.seed.hypertension.id, None)
        .await
        .unwrap_err();
    assert!(matches!(err, HospitalError::Conflict(_)));
}

#[tokio::test]
async fn past_and_beyond_horizon_timestamps_are_rejected() {
    let h = hospital().await;
    let admin = h.login("admin@hospital.test").await;

    let mut past = h.booking(h.seed.doctor_north, h.seed.dept_general_north.id, 0);
    past.scheduled_at = Utc::now() - Duration::hours(1);
    past.site_id = Some(h.seed.site_north.id);
    assert!(matches!(
        h.appointments.schedule(&admin, past).await.unwrap_err(),
        HospitalError::Validation(_)
    ));

    let mut far = h.booking(h.seed.doctor_north, h.seed.dept_general_north.id, 200);
    far.site_id = Some(h.seed.site_north.id);
    assert!(matches!(
        h.appointments.schedule(&admin, far).await.unwrap_err(),
        HospitalError::Validation(_)
    ));
}

#[tokio::test]
async fn doctor_listings_never_include_other_clinicians() {
    let h = hospital().await;
    let admin = h.login("admin@hospital.test").await;
    let mut north = h.booking(h.seed.doctor_north, h.seed.dept_general_north.id, 2);
    north.site_id = Some(h.seed.site_north.id);
    h.appointments.schedule(&admin, north).await.unwrap();
    let mut south = h.booking(h.seed.doctor_south, h.seed.dept_general_south.id, 2);
    south.site_id = Some(h.seed.site_south.id);
    h.appointments.schedule(&admin, south).await.unwrap();

    let doctor_north = h.login("mrincon@hospital.test").await;
    let rows = h.appointments.list(&doctor_north, None).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert!(rows.iter().all(|a| a.clinician_id == h.seed.doctor_north));

    // Site-scoped roles see their whole site but nothing beyond it.
    let nurse = h.login("apardo@hospital.test").await;
    let rows = h.appointments.list(&nurse, None).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert!(rows.iter().all(|a| a.site_id == h.seed.site_north.id));

    // The administrator sees both sites.
    assert_eq!(h.appointments.list(&admin, None).await.unwrap().len(), 2);
}

#[tokio::test]
async fn cross_site_history_reads_are_denied() {
    let h = hospital().await;
    let doctor_north = h.login("mrincon@hospital.test").await;
    let req = h.booking(h.seed.doctor_north, h.seed.dept_general_north.id, 1);
    let appointment = h.appointments.schedule(&doctor_north, req).await.unwrap();
    let history = h
        .clinical
        .register(&doctor_north, appointment.id, h.seed.influenza.id, None)
        .await
        .unwrap();

    let doctor_south = h.login("cvelez@hospital.test").await;
    let err = h.clinical.detail(&doctor_south, history.id).await.unwrap_err();
    assert!(matches!(err, HospitalError::NotAuthorized(_)));
}

#[tokio::test]
async fn insufficient_stock_leaves_inventory_unchanged() {
    let h = hospital().await;
    let doctor_south = h.login("cvelez@hospital.test").await;
    let req = h.booking(h.seed.doctor_south, h.seed.dept_general_south.id, 1);
    let appointment = h.appointments.schedule(&doctor_south, req).await.unwrap();
    let history = h
        .clinical
        .register(&doctor_south, appointment.id, h.seed.hypertension.id, None)
        .await
        .unwrap();

    // Sede Sur holds 8 units of amoxicillin.
    let err = h
        .pharmacy
        .prescribe(
            &doctor_south,
            NewPrescription {
                history_id: history.id,
                medication_id: h.seed.amoxicillin.id,
                dosage: "500mg".into(),
                frequency: "cada 8 horas".into(),
                duration_days: 7,
                quantity: 10,
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err, HospitalError::InsufficientStock { requested: 10, available: 8 });

    let record = h
        .store
        .get_inventory(h.seed.site_south.id, h.seed.amoxicillin.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.stock, 8, "a failed issuance must not touch stock");
    assert!(h.pharmacy.list(&doctor_south).await.unwrap().is_empty());
}

#[tokio::test]
async fn sequential_issuance_cannot_oversell() {
    let h = hospital().await;
    let doctor = h.login("mrincon@hospital.test").await;
    let req = h.booking(h.seed.doctor_north, h.seed.dept_general_north.id, 1);
    let appointment = h.appointments.schedule(&doctor, req).await.unwrap();
    let history = h
        .clinical
        .register(&doctor, appointment.id, h.seed.influenza.id, None)
        .await
        .unwrap();
    h.store
        .upsert_inventory(h.seed.site_north.id, h.seed.ibuprofen.id, 10)
        .await
        .unwrap();

    let rx = |quantity| NewPrescription {
        history_id: history.id,
        medication_id: h.seed.ibuprofen.id,
        dosage: "400mg".into(),
        frequency: "cada 12 horas".into(),
        duration_days: 5,
        quantity,
    };
    h.pharmacy.prescribe(&doctor, rx(5)).await.unwrap();
    let err = h.pharmacy.prescribe(&doctor, rx(8)).await.unwrap_err();
    assert_eq!(err, HospitalError::InsufficientStock { requested: 8, available: 5 });

    let record = h
        .store
        .get_inventory(h.seed.site_north.id, h.seed.ibuprofen.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.stock, 5);
}

#[tokio::test]
async fn prescription_duration_is_bounded() {
    let h = hospital().await;
    let doctor = h.login("mrincon@hospital.test").await;
    let req = h.booking(h.seed.doctor_north, h.seed.dept_general_north.id, 1);
    let appointment = h.appointments.schedule(&doctor, req).await.unwrap();
    let history = h
        .clinical
        .register(&doctor, appointment.id, h.seed.influenza.id, None)
        .await
        .unwrap();

    for duration_days in [0u32, 366] {
        let err = h
            .pharmacy
            .prescribe(
                &doctor,
                NewPrescription {
                    history_id: history.id,
                    medication_id: h.seed.amoxicillin.id,
                    dosage: "500mg".into(),
                    frequency: "diaria".into(),
                    duration_days,
                    quantity: 1,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, HospitalError::Validation(_)));
    }
}

#[tokio::test]
async fn nurses_cannot_prescribe() {
    let h = hospital().await;
    let nurse = h.login("apardo@hospital.test").await;
    let err = h
        .pharmacy
        .prescribe(
            &nurse,
            NewPrescription {
                history_id: uuid::Uuid::new_v4(),
                medication_id: h.seed.amoxicillin.id,
                dosage: "500mg".into(),
                frequency: "diaria".into(),
                duration_days: 5,
                quantity: 1,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, HospitalError::NotAuthorized(_)));
}

#[tokio::test]
async fn inactive_accounts_cannot_authenticate() {
    let h = hospital().await;
    h.store
        .set_employee_active(h.seed.nurse_north, false)
        .await
        .unwrap();
    let err = h
        .identity
        .authenticate("apardo@hospital.test", "changeme1", None)
        .await
        .unwrap_err();
    assert_eq!(err, HospitalError::AccountInactive);

    // A wrong password on the same account stays indistinguishable from a
    // wrong email.
    let err = h
        .identity
        .authenticate("apardo@hospital.test", "wrong-password", None)
        .await
        .unwrap_err();
    assert_eq!(err, HospitalError::InvalidCredentials);
}

#[tokio::test]
async fn duplicate_patient_documents_conflict() {
    let h = hospital().await;
    let admin = h.login("admin@hospital.test").await;
    let err = h
        .patients
        .create(
            &admin,
            NewPatient {
                first_name: "Otra".into(),
                last_name: "Persona".into(),
                document_type: DocumentType::CC,
                // Already used by the seeded patient.
                document_number: "20000001".into(),
                email: "otra@example.test".into(),
                birth_date: None,
                gender: None,
                address: None,
                phone: None,
                city: None,
                blood_type: None,
                allergies: None,
                emergency_contact: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, HospitalError::Conflict(_)));
}

#[tokio::test]
async fn patient_codes_are_sequential() {
    let h = hospital().await;
    let admin = h.login("admin@hospital.test").await;
    let (_, patient) = h
        .patients
        .create(
            &admin,
            NewPatient {
                first_name: "Nuevo".into(),
                last_name: "Paciente".into(),
                document_type: DocumentType::TI,
                document_number: "20000099".into(),
                email: "nuevo@example.test".into(),
                birth_date: None,
                gender: None,
                address: None,
                phone: None,
                city: None,
                blood_type: None,
                allergies: None,
                emergency_contact: None,
            },
        )
        .await
        .unwrap();
    // The seed registers PAC-1.
    assert_eq!(patient.code, "PAC-2");
}

#[tokio::test]
async fn decommissioned_equipment_rejects_every_transition() {
    let h = hospital().await;
    let admin = h.login("admin@hospital.test").await;
    let device = h
        .equipment
        .create(
            &admin,
            NewEquipment {
                name: "Monitor de signos vitales".into(),
                brand_model: Some("GE B125".into()),
                department_id: h.seed.dept_general_north.id,
                last_maintenance: None,
                responsible_employee: Some(h.seed.nurse_north),
            },
        )
        .await
        .unwrap();
    assert_eq!(device.status, EquipmentStatus::Operational);

    h.equipment
        .set_status(&admin, device.id, EquipmentStatus::Decommissioned, None)
        .await
        .unwrap();
    let err = h
        .equipment
        .set_status(&admin, device.id, EquipmentStatus::Operational, None)
        .await
        .unwrap_err();
    assert!(matches!(err, HospitalError::Conflict(_)));
}

#[tokio::test]
async fn audit_log_is_gated_and_newest_first() {
    let h = hospital().await;
    let audit = AuditService::new(Arc::clone(&h.store));

    let nurse = h.login("apardo@hospital.test").await;
    assert!(matches!(
        audit.read_log(&nurse, 50).await.unwrap_err(),
        HospitalError::NotAuthorized(_)
    ));

    let admin = h.login("admin@hospital.test").await;
    let events = audit.read_log(&admin, 50).await.unwrap();
    // Both logins above were recorded; the admin's is the most recent.
    assert!(events.len() >= 2);
    assert!(events
        .windows(2)
        .all(|w| w[0].occurred_at >= w[1].occurred_at));
}

#[tokio::test]
async fn patient_detail_follows_the_callers_scope() {
    let h = hospital().await;
    let admin = h.login("admin@hospital.test").await;
    let mut req = h.booking(h.seed.doctor_north, h.seed.dept_general_north.id, 2);
    req.site_id = Some(h.seed.site_north.id);
    let appointment = h.appointments.schedule(&admin, req).await.unwrap();

    // A doctor at the other site gets the demographic record but none of
    // the visits, exactly like the listings.
    let doctor_south = h.login("cvelez@hospital.test").await;
    let detail = h.patients.detail(&doctor_south, h.seed.patient).await.unwrap();
    assert!(
        detail.recent_appointments.is_empty(),
        "visits from another site and clinician must not appear"
    );

    // Site-bound roles at the visit's site see it; so does the admin.
    let nurse = h.login("apardo@hospital.test").await;
    let detail = h.patients.detail(&nurse, h.seed.patient).await.unwrap();
    assert_eq!(detail.recent_appointments.len(), 1);
    assert_eq!(detail.recent_appointments[0].id, appointment.id);
    let detail = h.patients.detail(&admin, h.seed.patient).await.unwrap();
    assert_eq!(detail.recent_appointments.len(), 1);
}

#[tokio::test]
async fn patient_detail_includes_scoped_prescriptions() {
    let h = hospital().await;
    let doctor = h.login("mrincon@hospital.test").await;
    let req = h.booking(h.seed.doctor_north, h.seed.dept_general_north.id, 1);
    let appointment = h.appointments.schedule(&doctor, req).await.unwrap();
    let history = h
        .clinical
        .register(&doctor, appointment.id, h.seed.influenza.id, None)
        .await
        .unwrap();
    let issued = h
        .pharmacy
        .prescribe(
            &doctor,
            NewPrescription {
                history_id: history.id,
                medication_id: h.seed.amoxicillin.id,
                dosage: "500mg".into(),
                frequency: "cada 8 horas".into(),
                duration_days: 7,
                quantity: 21,
            },
        )
        .await
        .unwrap();

    let detail = h.patients.detail(&doctor, h.seed.patient).await.unwrap();
    assert_eq!(detail.prescriptions.len(), 1);
    assert_eq!(detail.prescriptions[0].id, issued.id);

    // The other site's doctor sees neither the visit nor the prescription.
    let doctor_south = h.login("cvelez@hospital.test").await;
    let detail = h.patients.detail(&doctor_south, h.seed.patient).await.unwrap();
    assert!(detail.prescriptions.is_empty());
}

#[tokio::test]
async fn inventory_listings_stay_on_the_callers_site() {
    let h = hospital().await;
    let nurse = h.login("apardo@hospital.test").await;

    let lines = h.pharmacy.inventory(&nurse).await.unwrap();
    assert!(!lines.is_empty());
    assert!(lines
        .iter()
        .all(|l| l.record.site_id == h.seed.site_north.id));

    let low = h.pharmacy.low_stock(&nurse).await.unwrap();
    assert!(low.iter().all(|l| l.record.site_id == h.seed.site_north.id));
    // Sede Sur's 8-unit amoxicillin row is below threshold but off-site.
    assert!(!low
        .iter()
        .any(|l| l.record.medication_id == h.seed.amoxicillin.id
            && l.record.site_id == h.seed.site_south.id));

    // The administrator sees both sites' stock.
    let admin = h.login("admin@hospital.test").await;
    let all = h.pharmacy.inventory(&admin).await.unwrap();
    assert!(all.iter().any(|l| l.record.site_id == h.seed.site_south.id));
}

#[tokio::test]
async fn history_listings_stay_on_the_callers_site() {
    let h = hospital().await;
    let doctor_north = h.login("mrincon@hospital.test").await;
    let req = h.booking(h.seed.doctor_north, h.seed.dept_general_north.id, 1);
    let north_appt = h.appointments.schedule(&doctor_north, req).await.unwrap();
    let north_history = h
        .clinical
        .register(&doctor_north, north_appt.id, h.seed.influenza.id, None)
        .await
        .unwrap();

    let doctor_south = h.login("cvelez@hospital.test").await;
    let req = h.booking(h.seed.doctor_south, h.seed.dept_general_south.id, 1);
    let south_appt = h.appointments.schedule(&doctor_south, req).await.unwrap();
    let south_history = h
        .clinical
        .register(&doctor_south, south_appt.id, h.seed.hypertension.id, None)
        .await
        .unwrap();

    let nurse = h.login("apardo@hospital.test").await;
    let rows = h.clinical.list(&nurse).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, north_history.id);

    let rows = h.clinical.list(&doctor_south).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, south_history.id);

    let admin = h.login("admin@hospital.test").await;
    assert_eq!(h.clinical.list(&admin).await.unwrap().len(), 2);
}
