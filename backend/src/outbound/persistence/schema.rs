//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `migrations/` exactly. Nested sub-records
//! (addresses, specs, media, clauses, messages and the like) live in JSONB
//! columns; anything the adapters filter, scope or update atomically is a
//! plain column.
//!
//! `properties.city` and `properties.bhk` are stored generated columns
//! derived from the JSONB address and specs. They are declared here for
//! filtering and never written.

diesel::table! {
    /// Registered accounts, local or federated.
    users (id) {
        id -> Uuid,
        name -> Text,
        /// Lowercased; unique.
        email -> Text,
        /// bcrypt hash; null for federated-only accounts.
        password_hash -> Nullable<Text>,
        /// Provider subject; unique when present.
        federated_id -> Nullable<Text>,
        image -> Nullable<Text>,
        roles -> Array<Text>,
        checkpoint -> Text,
        landlord_profile -> Nullable<Jsonb>,
        tenant_profile -> Nullable<Jsonb>,
        subscription -> Nullable<Jsonb>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Landlord listings.
    properties (id) {
        id -> Uuid,
        owner_id -> Uuid,
        title -> Text,
        address -> Jsonb,
        /// Generated from `address->>'city'`.
        city -> Text,
        specs -> Jsonb,
        /// Generated from `specs->>'bhk'`.
        bhk -> Text,
        amenities -> Array<Text>,
        media -> Jsonb,
        expected_rent -> Float8,
        expected_deposit -> Float8,
        description -> Nullable<Text>,
        maintenance_details -> Nullable<Jsonb>,
        status -> Text,
        available_from -> Nullable<Timestamptz>,
        current_agreement_id -> Nullable<Uuid>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Rental agreements with flattened signature state.
    agreements (id) {
        id -> Uuid,
        property_id -> Uuid,
        landlord_id -> Uuid,
        tenant_id -> Nullable<Uuid>,
        agreement_type -> Text,
        start_date -> Timestamptz,
        end_date -> Timestamptz,
        rent_amount -> Float8,
        security_deposit -> Float8,
        rent_payment_date -> Int2,
        late_penalty_percentage -> Float8,
        maintenance_terms -> Nullable<Jsonb>,
        lock_in_period -> Int4,
        notice_period -> Int4,
        police_verification_status -> Text,
        rent_escalation -> Nullable<Jsonb>,
        clauses -> Jsonb,
        status -> Text,
        document_url -> Nullable<Text>,
        landlord_signed -> Bool,
        landlord_signed_at -> Nullable<Timestamptz>,
        landlord_ip -> Nullable<Text>,
        tenant_signed -> Bool,
        tenant_signed_at -> Nullable<Timestamptz>,
        tenant_ip -> Nullable<Text>,
        termination -> Nullable<Jsonb>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Rent, deposit and fee payments.
    payments (id) {
        id -> Uuid,
        agreement_id -> Uuid,
        payer_id -> Uuid,
        receiver_id -> Uuid,
        amount -> Float8,
        payment_type -> Text,
        description -> Nullable<Text>,
        due_date -> Timestamptz,
        paid_date -> Nullable<Timestamptz>,
        status -> Text,
        payment_method -> Nullable<Text>,
        transaction_id -> Nullable<Text>,
        razorpay_order_id -> Nullable<Text>,
        razorpay_payment_id -> Nullable<Text>,
        razorpay_signature -> Nullable<Text>,
        late_fee -> Float8,
        notes -> Nullable<Text>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Move-in, move-out and routine inspection reports.
    inspections (id) {
        id -> Uuid,
        agreement_id -> Uuid,
        property_id -> Uuid,
        landlord_id -> Uuid,
        tenant_id -> Nullable<Uuid>,
        inspection_type -> Text,
        inspection_date -> Timestamptz,
        conducted_by -> Uuid,
        photos -> Jsonb,
        issues -> Jsonb,
        overall_condition -> Text,
        signatures -> Jsonb,
        disputed -> Bool,
        dispute_reason -> Nullable<Text>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Support and maintenance tickets with their message thread.
    tickets (id) {
        id -> Uuid,
        agreement_id -> Nullable<Uuid>,
        author_id -> Uuid,
        assigned_to -> Nullable<Uuid>,
        ticket_type -> Text,
        title -> Text,
        description -> Text,
        status -> Text,
        priority -> Text,
        messages -> Jsonb,
        resolved_at -> Nullable<Timestamptz>,
        resolved_by -> Nullable<Uuid>,
        resolution_notes -> Nullable<Text>,
        escalated_at -> Nullable<Timestamptz>,
        escalation_reason -> Nullable<Text>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// In-app notifications per recipient.
    notifications (id) {
        id -> Uuid,
        user_id -> Uuid,
        notification_type -> Text,
        title -> Text,
        message -> Text,
        is_read -> Bool,
        read_at -> Nullable<Timestamptz>,
        link_to -> Nullable<Text>,
        related_model -> Nullable<Text>,
        related_id -> Nullable<Uuid>,
        channels -> Jsonb,
        delivery_status -> Jsonb,
        priority -> Text,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Metadata for files held by the media store.
    documents (id) {
        id -> Uuid,
        uploaded_by -> Uuid,
        name -> Text,
        document_type -> Text,
        category -> Nullable<Text>,
        url -> Text,
        public_id -> Text,
        file_size -> Nullable<Int8>,
        mime_type -> Nullable<Text>,
        related_model -> Nullable<Text>,
        related_id -> Nullable<Uuid>,
        is_public -> Bool,
        status -> Text,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::joinable!(properties -> users (owner_id));
diesel::joinable!(agreements -> properties (property_id));
diesel::joinable!(payments -> agreements (agreement_id));
diesel::joinable!(inspections -> agreements (agreement_id));
diesel::joinable!(notifications -> users (user_id));
diesel::joinable!(documents -> users (uploaded_by));

diesel::allow_tables_to_appear_in_same_query!(
    users,
    properties,
    agreements,
    payments,
    inspections,
    tickets,
    notifications,
    documents,
);
