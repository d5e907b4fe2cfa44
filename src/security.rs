use solana_security_txt::security_txt;

security_txt! {
    name: "Sponsor Paymaster program",
    project_url: "https://example.com/sponsor-paymaster",
    contacts: "email:security@example.com",
    policy: "https://example.com/sponsor-paymaster/security-policy"
}
