//! Esquema Diesel (escrito a mano). Reemplazable con `diesel print-schema`.

diesel::table! {
    calculations (id) {
        id -> Text,
        input_descriptor -> Text,
        formula -> Nullable<Text>,
        calculation_type -> Text,
        status -> Text,
        submission_time -> Timestamptz,
        completion_time -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    properties (calculation_id, property_name) {
        calculation_id -> Text,
        property_name -> Text,
        property_value -> Nullable<Double>,
        property_text -> Nullable<Text>,
        units -> Nullable<Text>,
    }
}

diesel::joinable!(properties -> calculations (calculation_id));

diesel::allow_tables_to_appear_in_same_query!(
    calculations,
    properties,
);
