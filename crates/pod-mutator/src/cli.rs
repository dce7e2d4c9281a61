use clap::builder::PossibleValue;
use clap::{Arg, ArgAction, Command, crate_authors, crate_description, crate_name, crate_version};

pub fn build_cli() -> Command {
    let mut args = vec![
        Arg::new("log-level")
            .long("log-level")
            .value_name("LOG_LEVEL")
            .env("POD_MUTATOR_LOG_LEVEL")
            .default_value("info")
            .value_parser([
                PossibleValue::new("trace"),
                PossibleValue::new("debug"),
                PossibleValue::new("info"),
                PossibleValue::new("warn"),
                PossibleValue::new("error"),
            ])
            .help("Log level"),
        Arg::new("log-fmt")
            .long("log-fmt")
            .value_name("LOG_FMT")
            .env("POD_MUTATOR_LOG_FMT")
            .default_value("text")
            .value_parser([PossibleValue::new("text"), PossibleValue::new("json")])
            .help("Log output format"),
        Arg::new("log-no-color")
            .long("log-no-color")
            .env("NO_COLOR")
            .action(ArgAction::SetTrue)
            .help("Disable colored output for logs"),
        Arg::new("address")
            .long("addr")
            .value_name("BIND_ADDRESS")
            .default_value("0.0.0.0")
            .env("POD_MUTATOR_BIND_ADDRESS")
            .help("Bind against ADDRESS"),
        Arg::new("port")
            .long("port")
            .value_name("PORT")
            .default_value("8443")
            .env("POD_MUTATOR_PORT")
            .help("Listen on PORT"),
        Arg::new("cert-file")
            .long("cert-file")
            .value_name("CERT_FILE")
            .default_value("/run/secrets/tls/tls.crt")
            .env("POD_MUTATOR_CERT_FILE")
            .help("Path to an X.509 certificate file for HTTPS. Leave empty, together with --key-file, to serve plain HTTP"),
        Arg::new("key-file")
            .long("key-file")
            .value_name("KEY_FILE")
            .default_value("/run/secrets/tls/tls.key")
            .env("POD_MUTATOR_KEY_FILE")
            .help("Path to an X.509 private key file for HTTPS"),
        Arg::new("label-name")
            .long("label-name")
            .value_name("LABEL_NAME")
            .default_value("")
            .env("LABEL_NAME")
            .help("Label added to Pods annotated with append.label/enabled=true, the name is used as value too"),
        Arg::new("sidecar-image")
            .long("sidecar-image")
            .value_name("SIDECAR_IMAGE")
            .default_value("")
            .env("SIDECAR_IMAGE")
            .help("Image of the init container injected into Pods annotated with append.sidecar/enabled=true"),
        Arg::new("ignored-namespaces")
            .long("ignored-namespaces")
            .value_name("NAMESPACES")
            .env("IGNORED_NAMESPACES")
            .action(ArgAction::Append)
            .value_delimiter(',')
            .default_values(["kube-system", "kube-public"])
            .help("Comma separated list of namespaces whose Pods are never mutated"),
    ];
    args.sort_by(|a, b| a.get_id().cmp(b.get_id()));

    Command::new(crate_name!())
        .author(crate_authors!())
        .version(crate_version!())
        .about(crate_description!())
        .args(args)
}
