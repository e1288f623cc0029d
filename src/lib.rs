pub mod shared {
    pub mod core {
        pub mod detail;
    }
    pub mod infrastructure {
        pub mod database;
        pub mod realtime;
        pub mod schema;
    }
}

pub mod modules {
    pub mod auth {
        pub mod core {
            pub mod account;
            pub mod password;
            pub mod ports;
        }
        pub mod use_cases {
            pub mod login;
            pub mod register_account;
        }
        pub mod adapters {
            pub mod outbound {
                pub mod accounts_in_memory;
                pub mod accounts_postgres;
            }
        }
        pub mod inbound {
            pub mod http;
        }
    }
    pub mod care_records {
        pub mod core {
            pub mod appointment;
            pub mod ports;
            pub mod prescription;
            pub mod schedule;
        }
        pub mod adapters {
            pub mod outbound {
                pub mod records_in_memory;
                pub mod records_postgres;
            }
        }
    }
    pub mod patient {
        pub mod errors;
        pub mod use_cases {
            pub mod book_appointment;
            pub mod book_lab;
            pub mod list_slots;
            pub mod upload_prescription;
        }
        pub mod inbound {
            pub mod http;
        }
    }
    pub mod admin {
        pub mod use_cases {
            pub mod update_status;
        }
        pub mod inbound {
            pub mod http;
        }
    }
}

pub mod shell;
