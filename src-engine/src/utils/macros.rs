// FICHIER : src-engine/src/utils/macros.rs

/// Affiche une info à l'utilisateur et logue l'événement
#[macro_export]
macro_rules! user_info {
    ($key:expr) => {{
        println!("{}", $key);
        tracing::info!(event = "user_notification", key = $key);
    }};
    ($key:expr, $($arg:tt)*) => {{
        let message = format!($($arg)*);
        println!("{}", message);
        tracing::info!(event = "user_notification", key = $key, message = %message);
    }};
}

/// Affiche un succès à l'utilisateur
#[macro_export]
macro_rules! user_success {
    ($key:expr) => {{
        println!("✅ {}", $key);
        tracing::info!(event = "user_success", key = $key);
    }};
    ($key:expr, $($arg:tt)*) => {{
        let message = format!($($arg)*);
        println!("✅ {}", message);
        tracing::info!(event = "user_success", key = $key, message = %message);
    }};
}

/// Affiche une erreur à l'utilisateur ET logue la structure technique
#[macro_export]
macro_rules! user_error {
    // Format enrichi : erreur + composant + action
    (
        $key:expr,
        error = $err:expr,
        component = $comp:expr,
        action = $action:expr
    ) => {{
        eprintln!("❌ [{}] {} : {}", $comp, $key, $err);
        tracing::error!(
            componentName = $comp, action = $action, error = %$err,
            event = "user_error", key = $key
        );
    }};

    ($key:expr, $($arg:tt)*) => {{
        let message = format!($($arg)*);
        eprintln!("❌ {}", message);
        tracing::error!(event = "user_error", key = $key, message = %message);
    }};
}
